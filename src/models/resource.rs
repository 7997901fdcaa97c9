// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Saved-link resource model and the membership join record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored resource record in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    /// Document ID
    pub id: String,
    /// Owning user's id
    pub owner_id: String,
    /// Display title
    pub title: String,
    /// Saved URL (must start with http:// or https://)
    pub link: String,
    /// Optional free-form note
    pub note: Option<String>,
    /// Single tag label
    pub tag: String,
    /// Whether the resource appears in the shared feed
    pub is_public: bool,
    /// Ids of collections this resource belongs to.
    /// Mirrors the membership join docs; order is irrelevant.
    #[serde(default)]
    pub collection_ids: Vec<String>,
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub updated_at: DateTime<Utc>,
}

/// Membership join record for efficient per-collection queries.
///
/// A membership doc for `(c, r)` exists iff `c` is in `r.collection_ids`;
/// every mutation keeps both sides in one transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    /// Collection id
    pub collection_id: String,
    /// Resource id
    pub resource_id: String,
    /// Owner of both sides (memberships never cross users)
    pub owner_id: String,
    /// When the resource was added to the collection
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub added_at: DateTime<Utc>,
}

impl Membership {
    /// Document ID: combine collection and resource ids to ensure uniqueness.
    pub fn doc_id(&self) -> String {
        membership_doc_id(&self.collection_id, &self.resource_id)
    }
}

/// Membership document id for a `(collection, resource)` pair.
pub fn membership_doc_id(collection_id: &str, resource_id: &str) -> String {
    format!("{}_{}", collection_id, resource_id)
}
