// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profile storage)
//! - Resources (saved links)
//! - Collections (named groupings)
//! - Memberships (join collection for collection/resource queries)
//!
//! The membership join docs and `Resource.collection_ids` are two views of
//! the same relationship; every mutation touching one side updates the
//! other in the same transaction.

use crate::db::collections;
use crate::error::AppError;
use crate::models::resource::membership_doc_id;
use crate::models::{Collection, Membership, Resource, User};
use firestore::path;

// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom; a single collection's
// membership fan-out must stay under this.
const MAX_TRANSACTION_WRITES: usize = 400;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // ExternalJwtFunctionSource provides a dummy token without needing
        // a custom TokenSource implementation struct.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by their identity-provider id.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a user profile.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Find users with the given username.
    ///
    /// Used by the uniqueness pre-check. There is no store-level unique
    /// constraint, so two concurrent signups can still both pass this.
    pub async fn find_users_by_username(&self, username: &str) -> Result<Vec<User>, AppError> {
        let username = username.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| q.for_all([q.field(path!(User::username)).eq(username.clone())]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Resource Operations ─────────────────────────────────────

    /// Get a resource by id.
    pub async fn get_resource(&self, resource_id: &str) -> Result<Option<Resource>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::RESOURCES)
            .obj()
            .one(resource_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store a resource (whole document).
    pub async fn set_resource(&self, resource: &Resource) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::RESOURCES)
            .document_id(&resource.id)
            .object(resource)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Partial merge of a resource: only the named fields are written.
    ///
    /// `resource` carries the merged values; `fields` is the mask of what
    /// the caller actually supplied. Omitted fields are untouched in the
    /// store, so concurrent edits to other fields are not clobbered.
    pub async fn update_resource_fields(
        &self,
        resource: &Resource,
        fields: Vec<String>,
    ) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(fields)
            .in_col(collections::RESOURCES)
            .document_id(&resource.id)
            .object(resource)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get resources owned by a user, newest first.
    ///
    /// With `collection_id`, only resources whose `collection_ids` contains
    /// that id are returned (Firestore array-contains filter).
    pub async fn list_resources(
        &self,
        owner_id: &str,
        collection_id: Option<&str>,
    ) -> Result<Vec<Resource>, AppError> {
        let owner_id = owner_id.to_string();
        let query = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::RESOURCES);

        let query = if let Some(collection_id) = collection_id {
            let collection_id = collection_id.to_string();
            query.filter(move |q| {
                q.for_all([
                    q.field(path!(Resource::owner_id)).eq(owner_id.clone()),
                    q.field(path!(Resource::collection_ids))
                        .array_contains(collection_id.clone()),
                ])
            })
        } else {
            query.filter(move |q| q.for_all([q.field(path!(Resource::owner_id)).eq(owner_id.clone())]))
        };

        query
            .order_by([(
                path!(Resource::created_at),
                firestore::FirestoreQueryDirection::Descending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get all public resources, newest first.
    ///
    /// The caller filters out its own resources; Firestore's `!=` operator
    /// would force an owner_id ordering we don't want.
    pub async fn list_public_resources(&self) -> Result<Vec<Resource>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::RESOURCES)
            .filter(|q| q.for_all([q.field(path!(Resource::is_public)).eq(true)]))
            .order_by([(
                path!(Resource::created_at),
                firestore::FirestoreQueryDirection::Descending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user's resources with the given link (duplicate guard).
    pub async fn find_resources_by_link(
        &self,
        owner_id: &str,
        link: &str,
    ) -> Result<Vec<Resource>, AppError> {
        let owner_id = owner_id.to_string();
        let link = link.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::RESOURCES)
            .filter(move |q| {
                q.for_all([
                    q.field(path!(Resource::owner_id)).eq(owner_id.clone()),
                    q.field(path!(Resource::link)).eq(link.clone()),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Collection Operations ───────────────────────────────────

    /// Get a collection by id.
    pub async fn get_collection(&self, collection_id: &str) -> Result<Option<Collection>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::COLLECTIONS)
            .obj()
            .one(collection_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store a collection (whole document).
    pub async fn set_collection(&self, collection: &Collection) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::COLLECTIONS)
            .document_id(&collection.id)
            .object(collection)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Partial merge of a collection, same contract as [`Self::update_resource_fields`].
    pub async fn update_collection_fields(
        &self,
        collection: &Collection,
        fields: Vec<String>,
    ) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(fields)
            .in_col(collections::COLLECTIONS)
            .document_id(&collection.id)
            .object(collection)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get a user's collections in their display order.
    pub async fn list_collections(&self, owner_id: &str) -> Result<Vec<Collection>, AppError> {
        let owner_id = owner_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::COLLECTIONS)
            .filter(move |q| q.for_all([q.field(path!(Collection::owner_id)).eq(owner_id.clone())]))
            .order_by([(
                path!(Collection::sort_order),
                firestore::FirestoreQueryDirection::Ascending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get shared collections across all users (cross-tenant listing).
    pub async fn list_shared_collections(&self) -> Result<Vec<Collection>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::COLLECTIONS)
            .filter(|q| q.for_all([q.field(path!(Collection::is_shared)).eq(true)]))
            .order_by([(
                path!(Collection::sort_order),
                firestore::FirestoreQueryDirection::Ascending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Membership Operations ───────────────────────────────────

    /// Get the membership doc for a (collection, resource) pair.
    pub async fn get_membership(
        &self,
        collection_id: &str,
        resource_id: &str,
    ) -> Result<Option<Membership>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::MEMBERSHIPS)
            .obj()
            .one(membership_doc_id(collection_id, resource_id))
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get all membership docs under a collection.
    pub async fn list_memberships_for_collection(
        &self,
        collection_id: &str,
    ) -> Result<Vec<Membership>, AppError> {
        let collection_id = collection_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::MEMBERSHIPS)
            .filter(move |q| {
                q.for_all([q
                    .field(path!(Membership::collection_id))
                    .eq(collection_id.clone())])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get all membership docs referencing a resource.
    pub async fn list_memberships_for_resource(
        &self,
        resource_id: &str,
    ) -> Result<Vec<Membership>, AppError> {
        let resource_id = resource_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::MEMBERSHIPS)
            .filter(move |q| {
                q.for_all([q
                    .field(path!(Membership::resource_id))
                    .eq(resource_id.clone())])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Atomic Membership Synchronization ───────────────────────

    /// Atomically link a resource into a collection.
    ///
    /// One transaction: set the membership doc and arrayUnion the
    /// collection id into the resource's `collection_ids`. Both writes are
    /// idempotent, so linking an already-linked pair is a no-op commit.
    ///
    /// Both documents are re-read inside the transaction. This registers
    /// them for conflict detection: if either is deleted concurrently the
    /// commit aborts instead of the array transform resurrecting a ghost
    /// resource or the membership doc pointing at a dead collection.
    pub async fn add_membership_atomic(&self, membership: &Membership) -> Result<(), AppError> {
        let client = self.get_client()?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        if self.get_resource(&membership.resource_id).await?.is_none() {
            let _ = transaction.rollback().await;
            return Err(AppError::Conflict(format!(
                "Resource {} was removed concurrently",
                membership.resource_id
            )));
        }
        if self
            .get_collection(&membership.collection_id)
            .await?
            .is_none()
        {
            let _ = transaction.rollback().await;
            return Err(AppError::Conflict(format!(
                "Collection {} was removed concurrently",
                membership.collection_id
            )));
        }

        client
            .fluent()
            .update()
            .in_col(collections::MEMBERSHIPS)
            .document_id(membership.doc_id())
            .object(membership)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add membership to transaction: {}", e))
            })?;

        client
            .fluent()
            .update()
            .in_col(collections::RESOURCES)
            .document_id(&membership.resource_id)
            .transforms(|t| {
                t.fields([t
                    .field(path!(Resource::collection_ids))
                    .append_missing_elements([membership.collection_id.clone()])])
            })
            .only_transform()
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add array union to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Conflict(format!("Membership add did not commit: {}", e)))?;

        tracing::debug!(
            collection_id = %membership.collection_id,
            resource_id = %membership.resource_id,
            "Membership added"
        );

        Ok(())
    }

    /// Atomically unlink a resource from a collection.
    ///
    /// Deleting a missing membership doc and removing an absent array
    /// element are both no-ops, so removing an unlinked pair succeeds.
    pub async fn remove_membership_atomic(
        &self,
        collection_id: &str,
        resource_id: &str,
    ) -> Result<(), AppError> {
        let client = self.get_client()?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        client
            .fluent()
            .delete()
            .from(collections::MEMBERSHIPS)
            .document_id(membership_doc_id(collection_id, resource_id))
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add deletion to transaction: {}", e))
            })?;

        client
            .fluent()
            .update()
            .in_col(collections::RESOURCES)
            .document_id(resource_id)
            .transforms(|t| {
                t.fields([t
                    .field(path!(Resource::collection_ids))
                    .remove_all_from_array([collection_id.to_string()])])
            })
            .only_transform()
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add array remove to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Conflict(format!("Membership remove did not commit: {}", e)))?;

        tracing::debug!(collection_id, resource_id, "Membership removed");

        Ok(())
    }

    /// Atomically replace a resource's full collection assignment.
    ///
    /// One transaction writes the membership inserts, the membership
    /// deletes, and the resource's new `collection_ids` (plus updated_at).
    /// Memberships in the kept intersection are untouched, preserving
    /// their `added_at`.
    ///
    /// The resource is re-read inside the transaction. This registers it
    /// for conflict detection: a concurrent delete aborts the commit,
    /// otherwise the masked write would recreate the document with only
    /// `collection_ids` and `updated_at`.
    pub async fn reconcile_memberships_atomic(
        &self,
        resource: &Resource,
        to_add: &[Membership],
        to_remove: &[String],
    ) -> Result<(), AppError> {
        let client = self.get_client()?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        if self.get_resource(&resource.id).await?.is_none() {
            let _ = transaction.rollback().await;
            return Err(AppError::Conflict(format!(
                "Resource {} was removed concurrently",
                resource.id
            )));
        }

        for membership in to_add {
            client
                .fluent()
                .update()
                .in_col(collections::MEMBERSHIPS)
                .document_id(membership.doc_id())
                .object(membership)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add membership to transaction: {}", e))
                })?;
        }

        for collection_id in to_remove {
            client
                .fluent()
                .delete()
                .from(collections::MEMBERSHIPS)
                .document_id(membership_doc_id(collection_id, &resource.id))
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add deletion to transaction: {}", e))
                })?;
        }

        client
            .fluent()
            .update()
            .fields([
                path!(Resource::collection_ids),
                path!(Resource::updated_at),
            ])
            .in_col(collections::RESOURCES)
            .document_id(&resource.id)
            .object(resource)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add resource write to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Conflict(format!("Reconcile did not commit: {}", e)))?;

        tracing::info!(
            resource_id = %resource.id,
            added = to_add.len(),
            removed = to_remove.len(),
            "Collection assignment reconciled"
        );

        Ok(())
    }

    /// Atomically create a resource together with its initial memberships.
    ///
    /// Reconcile with current = empty, fused with the document insert.
    ///
    /// Each target collection is re-read inside the transaction. This
    /// registers them for conflict detection, so a collection deleted
    /// concurrently aborts the commit instead of leaving membership docs
    /// pointing at it.
    pub async fn create_resource_atomic(
        &self,
        resource: &Resource,
        memberships: &[Membership],
    ) -> Result<(), AppError> {
        let client = self.get_client()?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        for membership in memberships {
            if self
                .get_collection(&membership.collection_id)
                .await?
                .is_none()
            {
                let _ = transaction.rollback().await;
                return Err(AppError::Conflict(format!(
                    "Collection {} was removed concurrently",
                    membership.collection_id
                )));
            }
        }

        client
            .fluent()
            .update()
            .in_col(collections::RESOURCES)
            .document_id(&resource.id)
            .object(resource)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add resource to transaction: {}", e))
            })?;

        for membership in memberships {
            client
                .fluent()
                .update()
                .in_col(collections::MEMBERSHIPS)
                .document_id(membership.doc_id())
                .object(membership)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add membership to transaction: {}", e))
                })?;
        }

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Conflict(format!("Resource create did not commit: {}", e)))?;

        tracing::info!(
            resource_id = %resource.id,
            memberships = memberships.len(),
            "Resource created"
        );

        Ok(())
    }

    /// Atomically delete a resource and every membership doc it appears in.
    pub async fn delete_resource_atomic(&self, resource: &Resource) -> Result<(), AppError> {
        let client = self.get_client()?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        client
            .fluent()
            .delete()
            .from(collections::RESOURCES)
            .document_id(&resource.id)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add deletion to transaction: {}", e))
            })?;

        for collection_id in &resource.collection_ids {
            client
                .fluent()
                .delete()
                .from(collections::MEMBERSHIPS)
                .document_id(membership_doc_id(collection_id, &resource.id))
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add deletion to transaction: {}", e))
                })?;
        }

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Conflict(format!("Resource delete did not commit: {}", e)))?;

        tracing::info!(
            resource_id = %resource.id,
            memberships = resource.collection_ids.len(),
            "Resource deleted with membership teardown"
        );

        Ok(())
    }

    /// Atomically delete a collection, its membership docs, and pull its id
    /// out of every referenced resource's `collection_ids`.
    ///
    /// The resource mutation is an array-remove field transform, not a
    /// read-rewrite, so concurrent edits to other resource fields survive.
    /// Succeeds with an empty membership list.
    pub async fn delete_collection_atomic(
        &self,
        collection_id: &str,
        memberships: &[Membership],
    ) -> Result<(), AppError> {
        // 1 collection delete + 2 writes per membership
        if 1 + memberships.len() * 2 > MAX_TRANSACTION_WRITES {
            return Err(AppError::Database(format!(
                "Collection {} has too many memberships for one transaction",
                collection_id
            )));
        }

        let client = self.get_client()?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        client
            .fluent()
            .delete()
            .from(collections::COLLECTIONS)
            .document_id(collection_id)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add deletion to transaction: {}", e))
            })?;

        for membership in memberships {
            client
                .fluent()
                .delete()
                .from(collections::MEMBERSHIPS)
                .document_id(membership.doc_id())
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add deletion to transaction: {}", e))
                })?;

            client
                .fluent()
                .update()
                .in_col(collections::RESOURCES)
                .document_id(&membership.resource_id)
                .transforms(|t| {
                    t.fields([t
                        .field(path!(Resource::collection_ids))
                        .remove_all_from_array([collection_id.to_string()])])
                })
                .only_transform()
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add array remove to transaction: {}", e))
                })?;
        }

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Conflict(format!("Collection delete did not commit: {}", e)))?;

        tracing::info!(
            collection_id,
            memberships = memberships.len(),
            "Collection deleted with membership teardown"
        );

        Ok(())
    }
}
