// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Membership synchronization between resources and collections.
//!
//! A resource carries the denormalized list of collection ids it belongs
//! to, and the `memberships` collection carries one join doc per
//! (collection, resource) pair. The two must agree at all times, so every
//! entry point here validates its preconditions and then commits both
//! sides through one of the atomic operations in [`FirestoreDb`].
//!
//! A (resource, collection) pair is only ever Linked or Unlinked; callers
//! never observe a partially-applied state.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::{Membership, Resource};

/// Keeps `Resource.collection_ids` and the membership join docs consistent.
#[derive(Clone)]
pub struct MembershipService {
    db: FirestoreDb,
}

impl MembershipService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Link a resource into a collection. Idempotent.
    ///
    /// Both documents must exist and belong to `owner_id`; memberships
    /// never cross users.
    pub async fn add(
        &self,
        owner_id: &str,
        resource_id: &str,
        collection_id: &str,
    ) -> Result<()> {
        let collection = self
            .db
            .get_collection(collection_id)
            .await?
            .filter(|c| c.owner_id == owner_id)
            .ok_or_else(|| AppError::NotFound(format!("Collection {} not found", collection_id)))?;

        let _resource = self
            .db
            .get_resource(resource_id)
            .await?
            .filter(|r| r.owner_id == owner_id)
            .ok_or_else(|| AppError::NotFound(format!("Resource {} not found", resource_id)))?;

        let membership = Membership {
            collection_id: collection.id,
            resource_id: resource_id.to_string(),
            owner_id: owner_id.to_string(),
            added_at: chrono::Utc::now(),
        };

        self.db.add_membership_atomic(&membership).await
    }

    /// Unlink a resource from a collection.
    ///
    /// Removing a pair that was never linked is a no-op success.
    pub async fn remove(
        &self,
        owner_id: &str,
        resource_id: &str,
        collection_id: &str,
    ) -> Result<()> {
        let _resource = self
            .db
            .get_resource(resource_id)
            .await?
            .filter(|r| r.owner_id == owner_id)
            .ok_or_else(|| AppError::NotFound(format!("Resource {} not found", resource_id)))?;

        self.db
            .remove_membership_atomic(collection_id, resource_id)
            .await
    }

    /// Replace a resource's full collection assignment in one transaction.
    ///
    /// `resource` is the caller's current read of the document; the diff
    /// against `desired` decides which membership docs to insert and
    /// delete. Kept memberships are untouched, so their `added_at`
    /// survives. A commit failure surfaces as `Conflict` and the caller
    /// retries against fresh state.
    pub async fn reconcile(
        &self,
        owner_id: &str,
        resource: &Resource,
        desired: &[String],
    ) -> Result<()> {
        let desired = dedupe(desired);
        let (to_add, to_remove) = membership_diff(&resource.collection_ids, &desired);

        // Every newly linked collection must exist and belong to the owner.
        for collection_id in &to_add {
            self.db
                .get_collection(collection_id)
                .await?
                .filter(|c| c.owner_id == owner_id)
                .ok_or_else(|| {
                    AppError::NotFound(format!("Collection {} not found", collection_id))
                })?;
        }

        let now = chrono::Utc::now();
        let added: Vec<Membership> = to_add
            .iter()
            .map(|collection_id| Membership {
                collection_id: collection_id.clone(),
                resource_id: resource.id.clone(),
                owner_id: owner_id.to_string(),
                added_at: now,
            })
            .collect();

        let mut updated = resource.clone();
        updated.collection_ids = desired;
        updated.updated_at = now;

        self.db
            .reconcile_memberships_atomic(&updated, &added, &to_remove)
            .await
    }

    /// Build the membership docs for a brand-new resource.
    ///
    /// Creation is reconcile with current = empty; the caller commits the
    /// returned docs in the same transaction as the resource insert.
    pub async fn memberships_for_new_resource(
        &self,
        owner_id: &str,
        resource_id: &str,
        collection_ids: &[String],
    ) -> Result<Vec<Membership>> {
        for collection_id in collection_ids {
            self.db
                .get_collection(collection_id)
                .await?
                .filter(|c| c.owner_id == owner_id)
                .ok_or_else(|| {
                    AppError::NotFound(format!("Collection {} not found", collection_id))
                })?;
        }

        let now = chrono::Utc::now();
        Ok(collection_ids
            .iter()
            .map(|collection_id| Membership {
                collection_id: collection_id.clone(),
                resource_id: resource_id.to_string(),
                owner_id: owner_id.to_string(),
                added_at: now,
            })
            .collect())
    }
}

/// Set difference in both directions: `(desired − current, current − desired)`.
pub fn membership_diff(current: &[String], desired: &[String]) -> (Vec<String>, Vec<String>) {
    let to_add = desired
        .iter()
        .filter(|id| !current.contains(id))
        .cloned()
        .collect();
    let to_remove = current
        .iter()
        .filter(|id| !desired.contains(id))
        .cloned()
        .collect();
    (to_add, to_remove)
}

/// Drop duplicate ids while preserving first-seen order.
pub fn dedupe(ids: &[String]) -> Vec<String> {
    let mut seen = Vec::with_capacity(ids.len());
    for id in ids {
        if !seen.contains(id) {
            seen.push(id.clone());
        }
    }
    seen
}
