// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Collection CRUD and the delete-cascade that keeps resources truthful.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::Collection;
use firestore::path;
use serde::Deserialize;

/// Fields for creating a collection.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCollection {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub is_shared: Option<bool>,
    #[serde(default)]
    pub sort_order: Option<i64>,
}

/// Partial update of a collection; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollectionUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub is_shared: Option<bool>,
    pub sort_order: Option<i64>,
}

/// Collection store operations.
#[derive(Clone)]
pub struct CollectionService {
    db: FirestoreDb,
}

impl CollectionService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Create a collection.
    ///
    /// `sort_order` defaults to the current epoch millis, which gives new
    /// collections a monotonically increasing default position without
    /// reading the existing max.
    pub async fn create(&self, owner_id: &str, fields: NewCollection) -> Result<Collection> {
        if fields.name.trim().is_empty() {
            return Err(AppError::Validation(
                "Missing required field: name".to_string(),
            ));
        }

        let now = chrono::Utc::now();
        let collection = Collection {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            name: fields.name,
            description: fields.description.unwrap_or_default(),
            icon: fields.icon,
            color: fields.color,
            is_shared: fields.is_shared.unwrap_or(false),
            sort_order: fields.sort_order.unwrap_or_else(|| now.timestamp_millis()),
            created_at: now,
            updated_at: now,
        };

        self.db.set_collection(&collection).await?;
        Ok(collection)
    }

    /// Get a collection, scoped to its owner.
    pub async fn get(&self, owner_id: &str, collection_id: &str) -> Result<Collection> {
        self.db
            .get_collection(collection_id)
            .await?
            .filter(|c| c.owner_id == owner_id)
            .ok_or_else(|| AppError::NotFound(format!("Collection {} not found", collection_id)))
    }

    /// A user's collections in display order.
    pub async fn list(&self, owner_id: &str) -> Result<Vec<Collection>> {
        self.db.list_collections(owner_id).await
    }

    /// Shared collections across all users, in display order.
    ///
    /// Cross-tenant by design; the Collection entity carries nothing
    /// owner-private beyond the owner id itself.
    pub async fn list_shared(&self) -> Result<Vec<Collection>> {
        self.db.list_shared_collections().await
    }

    /// Partial merge update.
    pub async fn update(
        &self,
        owner_id: &str,
        collection_id: &str,
        update: CollectionUpdate,
    ) -> Result<Collection> {
        let mut collection = self.get(owner_id, collection_id).await?;

        let mut fields = vec![path!(Collection::updated_at)];
        if let Some(name) = update.name {
            if name.trim().is_empty() {
                return Err(AppError::Validation(
                    "Collection name cannot be empty".to_string(),
                ));
            }
            collection.name = name;
            fields.push(path!(Collection::name));
        }
        if let Some(description) = update.description {
            collection.description = description;
            fields.push(path!(Collection::description));
        }
        if let Some(icon) = update.icon {
            collection.icon = Some(icon).filter(|i| !i.is_empty());
            fields.push(path!(Collection::icon));
        }
        if let Some(color) = update.color {
            collection.color = Some(color).filter(|c| !c.is_empty());
            fields.push(path!(Collection::color));
        }
        if let Some(is_shared) = update.is_shared {
            collection.is_shared = is_shared;
            fields.push(path!(Collection::is_shared));
        }
        if let Some(sort_order) = update.sort_order {
            collection.sort_order = sort_order;
            fields.push(path!(Collection::sort_order));
        }
        collection.updated_at = chrono::Utc::now();

        self.db.update_collection_fields(&collection, fields).await?;
        Ok(collection)
    }

    /// Delete a collection and cascade to its memberships.
    ///
    /// Member resources survive; the collection id is pulled out of each
    /// one's `collection_ids` in the same transaction that deletes the
    /// collection and membership docs. An empty collection deletes fine.
    pub async fn delete(&self, owner_id: &str, collection_id: &str) -> Result<()> {
        let collection = self.get(owner_id, collection_id).await?;

        let memberships = self
            .db
            .list_memberships_for_collection(&collection.id)
            .await?;

        self.db
            .delete_collection_atomic(&collection.id, &memberships)
            .await
    }
}
