// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Collection CRUD and membership routes.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::Collection;
use crate::services::collection::{CollectionUpdate, NewCollection};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/collections",
            get(list_collections).post(create_collection),
        )
        .route(
            "/api/collections/{id}",
            put(update_collection).delete(delete_collection),
        )
        .route(
            "/api/memberships",
            post(add_membership).delete(remove_membership),
        )
}

/// Collection payload sent to the frontend.
#[derive(Serialize)]
pub struct CollectionResponse {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub description: String,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub is_shared: bool,
    pub sort_order: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Collection> for CollectionResponse {
    fn from(c: Collection) -> Self {
        Self {
            id: c.id,
            owner_id: c.owner_id,
            name: c.name,
            description: c.description,
            icon: c.icon,
            color: c.color,
            is_shared: c.is_shared,
            sort_order: c.sort_order,
            created_at: c.created_at.to_rfc3339(),
            updated_at: c.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Deserialize)]
struct ListCollectionsQuery {
    /// List shared collections across all users instead of the caller's own
    #[serde(default)]
    shared: bool,
}

#[derive(Serialize)]
pub struct CollectionListResponse {
    pub collections: Vec<CollectionResponse>,
}

/// List collections: the caller's own, or the cross-user shared listing.
async fn list_collections(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<ListCollectionsQuery>,
) -> Result<Json<CollectionListResponse>> {
    let collections = if params.shared {
        state.collections.list_shared().await?
    } else {
        state.collections.list(&user.user_id).await?
    };

    Ok(Json(CollectionListResponse {
        collections: collections.into_iter().map(Into::into).collect(),
    }))
}

/// Create a collection.
async fn create_collection(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<NewCollection>,
) -> Result<Json<CollectionResponse>> {
    let collection = state.collections.create(&user.user_id, body).await?;
    Ok(Json(collection.into()))
}

/// Partial update of a collection.
async fn update_collection(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(body): Json<CollectionUpdate>,
) -> Result<Json<CollectionResponse>> {
    let collection = state.collections.update(&user.user_id, &id, body).await?;
    Ok(Json(collection.into()))
}

#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Delete a collection. Member resources survive; their membership in
/// this collection is torn down atomically.
async fn delete_collection(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>> {
    state.collections.delete(&user.user_id, &id).await?;
    Ok(Json(SuccessResponse { success: true }))
}

#[derive(Deserialize)]
struct MembershipBody {
    resource_id: String,
    collection_id: String,
}

/// Link a resource into a collection (idempotent).
async fn add_membership(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<MembershipBody>,
) -> Result<Json<SuccessResponse>> {
    state
        .memberships
        .add(&user.user_id, &body.resource_id, &body.collection_id)
        .await?;
    Ok(Json(SuccessResponse { success: true }))
}

#[derive(Deserialize)]
struct MembershipQuery {
    resource_id: String,
    collection_id: String,
}

/// Unlink a resource from a collection (no-op if not linked).
async fn remove_membership(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<MembershipQuery>,
) -> Result<Json<SuccessResponse>> {
    state
        .memberships
        .remove(&user.user_id, &params.resource_id, &params.collection_id)
        .await?;
    Ok(Json(SuccessResponse { success: true }))
}
