//! User model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User profile stored in Firestore.
///
/// The document ID is the identity provider's user id; this layer treats
/// it as an opaque string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Identity-provider user id (also used as document ID)
    pub id: String,
    /// Unique handle, 3-20 chars of [a-z0-9_-]
    pub username: String,
    /// Email address
    pub email: String,
    /// Whether new resources default to public
    pub share_by_default: bool,
    /// When the profile was first created
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub created_at: DateTime<Utc>,
    /// Last profile update
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub updated_at: DateTime<Utc>,
}

/// Per-user resource counts, recomputed on demand.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceStats {
    pub total: u32,
    pub public: u32,
    pub private: u32,
}
