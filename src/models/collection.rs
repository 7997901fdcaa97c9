// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Named collection model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named grouping of resources, owned by one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    /// Document ID
    pub id: String,
    /// Owning user's id
    pub owner_id: String,
    /// Display name
    pub name: String,
    /// Description (empty string if not supplied)
    #[serde(default)]
    pub description: String,
    /// Icon identifier chosen by the owner
    pub icon: Option<String>,
    /// Accent color chosen by the owner
    pub color: Option<String>,
    /// Whether the collection appears in the shared listing
    pub is_shared: bool,
    /// Owner-controlled display order; defaults to creation time in
    /// milliseconds so new collections sort after existing ones without
    /// reading the current max.
    pub sort_order: i64,
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub updated_at: DateTime<Utc>,
}
