// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Resource CRUD and the operations layered on it:
//! delete teardown, save-from-feed, and the per-user stats scan.
//!
//! Validation happens eagerly here, before any store call; a validation
//! failure never leaves a partial write behind.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::{Resource, ResourceStats};
use crate::services::membership::{dedupe, MembershipService};
use firestore::path;
use serde::Deserialize;

/// Fields for creating a resource.
#[derive(Debug, Clone, Deserialize)]
pub struct NewResource {
    pub title: String,
    pub link: String,
    pub tag: String,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub is_public: Option<bool>,
    #[serde(default)]
    pub collection_ids: Option<Vec<String>>,
}

/// Partial update of a resource. Absent fields keep their stored value;
/// that contract is caller-visible, not an implementation detail.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceUpdate {
    pub title: Option<String>,
    pub link: Option<String>,
    /// An empty string clears the note.
    pub note: Option<String>,
    pub tag: Option<String>,
    pub is_public: Option<bool>,
    pub collection_ids: Option<Vec<String>>,
}

/// Resource store operations.
#[derive(Clone)]
pub struct ResourceService {
    db: FirestoreDb,
    memberships: MembershipService,
}

impl ResourceService {
    pub fn new(db: FirestoreDb, memberships: MembershipService) -> Self {
        Self { db, memberships }
    }

    /// Create a resource, optionally linked into collections from the start.
    ///
    /// With an initial collection list the resource insert and all
    /// membership inserts commit as one transaction.
    pub async fn create(&self, owner_id: &str, fields: NewResource) -> Result<Resource> {
        validate_required(&fields.title, "title")?;
        validate_required(&fields.tag, "tag")?;
        validate_link(&fields.link)?;

        let collection_ids = dedupe(fields.collection_ids.as_deref().unwrap_or(&[]));
        let now = chrono::Utc::now();

        let resource = Resource {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            title: fields.title,
            link: fields.link,
            note: fields.note.filter(|n| !n.is_empty()),
            tag: fields.tag,
            is_public: fields.is_public.unwrap_or(false),
            collection_ids: collection_ids.clone(),
            created_at: now,
            updated_at: now,
        };

        if collection_ids.is_empty() {
            self.db.set_resource(&resource).await?;
        } else {
            let memberships = self
                .memberships
                .memberships_for_new_resource(owner_id, &resource.id, &collection_ids)
                .await?;
            self.db
                .create_resource_atomic(&resource, &memberships)
                .await?;
        }

        Ok(resource)
    }

    /// Get a resource, scoped to its owner.
    pub async fn get(&self, owner_id: &str, resource_id: &str) -> Result<Resource> {
        self.db
            .get_resource(resource_id)
            .await?
            .filter(|r| r.owner_id == owner_id)
            .ok_or_else(|| AppError::NotFound(format!("Resource {} not found", resource_id)))
    }

    /// List a user's resources, newest first, optionally filtered to one
    /// collection.
    pub async fn list(
        &self,
        owner_id: &str,
        collection_id: Option<&str>,
    ) -> Result<Vec<Resource>> {
        self.db.list_resources(owner_id, collection_id).await
    }

    /// Partial merge update. Only fields present in `update` are written;
    /// a supplied `collection_ids` routes through the reconcile path.
    pub async fn update(
        &self,
        owner_id: &str,
        resource_id: &str,
        update: ResourceUpdate,
    ) -> Result<()> {
        if let Some(link) = &update.link {
            validate_link(link)?;
        }
        if let Some(title) = &update.title {
            validate_required(title, "title")?;
        }

        let mut resource = self.get(owner_id, resource_id).await?;

        let mut fields = vec![path!(Resource::updated_at)];
        if let Some(title) = update.title {
            resource.title = title;
            fields.push(path!(Resource::title));
        }
        if let Some(link) = update.link {
            resource.link = link;
            fields.push(path!(Resource::link));
        }
        if let Some(note) = update.note {
            resource.note = Some(note).filter(|n| !n.is_empty());
            fields.push(path!(Resource::note));
        }
        if let Some(tag) = update.tag {
            resource.tag = tag;
            fields.push(path!(Resource::tag));
        }
        if let Some(is_public) = update.is_public {
            resource.is_public = is_public;
            fields.push(path!(Resource::is_public));
        }
        resource.updated_at = chrono::Utc::now();

        if fields.len() > 1 {
            self.db.update_resource_fields(&resource, fields).await?;
        }

        if let Some(desired) = update.collection_ids {
            self.memberships
                .reconcile(owner_id, &resource, &desired)
                .await?;
        }

        Ok(())
    }

    /// Delete a resource, tearing down every membership it appears in
    /// within the same transaction.
    pub async fn delete(&self, owner_id: &str, resource_id: &str) -> Result<()> {
        let resource = self.get(owner_id, resource_id).await?;
        self.db.delete_resource_atomic(&resource).await
    }

    /// Copy a public resource from the feed into the caller's own space.
    ///
    /// The copy is a new private resource, not a reference. Fails with
    /// `Conflict` if the caller already saved the same link.
    pub async fn save_from_feed(&self, user_id: &str, resource_id: &str) -> Result<Resource> {
        let original = self
            .db
            .get_resource(resource_id)
            .await?
            .filter(|r| r.is_public)
            .ok_or_else(|| AppError::NotFound(format!("Resource {} not found", resource_id)))?;

        let existing = self
            .db
            .find_resources_by_link(user_id, &original.link)
            .await?;
        if !existing.is_empty() {
            return Err(AppError::Conflict(
                "You already have this resource saved".to_string(),
            ));
        }

        let now = chrono::Utc::now();
        let copy = Resource {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: user_id.to_string(),
            title: original.title,
            link: original.link,
            note: original.note,
            tag: original.tag,
            is_public: false, // Always save as private
            collection_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        self.db.set_resource(&copy).await?;

        tracing::info!(
            user_id,
            source_resource = resource_id,
            new_resource = %copy.id,
            "Resource saved from feed"
        );

        Ok(copy)
    }

    /// All public resources from other users, newest first.
    pub async fn list_public_feed(&self, requesting_user_id: &str) -> Result<Vec<Resource>> {
        let resources = self.db.list_public_resources().await?;
        Ok(resources
            .into_iter()
            .filter(|r| r.owner_id != requesting_user_id)
            .collect())
    }

    /// Per-user counts, recomputed from the resource store on demand.
    pub async fn stats(&self, user_id: &str) -> Result<ResourceStats> {
        let resources = self.db.list_resources(user_id, None).await?;
        let total = resources.len() as u32;
        let public = resources.iter().filter(|r| r.is_public).count() as u32;

        Ok(ResourceStats {
            total,
            public,
            private: total - public,
        })
    }
}

/// A saved link must be an absolute http(s) URL.
pub fn validate_link(link: &str) -> Result<()> {
    if link.starts_with("http://") || link.starts_with("https://") {
        Ok(())
    } else {
        Err(AppError::Validation(
            "Link must start with http:// or https://".to_string(),
        ))
    }
}

fn validate_required(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(AppError::Validation(format!("Missing required field: {}", field)))
    } else {
        Ok(())
    }
}
