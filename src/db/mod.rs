//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const RESOURCES: &str = "resources";
    pub const COLLECTIONS: &str = "collections";
    /// Membership join docs (keyed by `{collection_id}_{resource_id}`)
    pub const MEMBERSHIPS: &str = "memberships";
}
