// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Resource CRUD routes for the authenticated user.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::Resource;
use crate::services::resource::{NewResource, ResourceUpdate};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/resources", get(list_resources).post(create_resource))
        .route(
            "/api/resources/{id}",
            put(update_resource).delete(delete_resource),
        )
}

/// Resource payload sent to the frontend.
#[derive(Serialize)]
pub struct ResourceResponse {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub link: String,
    pub note: Option<String>,
    pub tag: String,
    pub is_public: bool,
    pub collection_ids: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Resource> for ResourceResponse {
    fn from(r: Resource) -> Self {
        Self {
            id: r.id,
            owner_id: r.owner_id,
            title: r.title,
            link: r.link,
            note: r.note,
            tag: r.tag,
            is_public: r.is_public,
            collection_ids: r.collection_ids,
            created_at: r.created_at.to_rfc3339(),
            updated_at: r.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Deserialize)]
struct ListResourcesQuery {
    /// Restrict to resources in this collection
    collection_id: Option<String>,
}

#[derive(Serialize)]
pub struct ResourceListResponse {
    pub resources: Vec<ResourceResponse>,
}

/// List the current user's resources, newest first.
async fn list_resources(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<ListResourcesQuery>,
) -> Result<Json<ResourceListResponse>> {
    let resources = state
        .resources
        .list(&user.user_id, params.collection_id.as_deref())
        .await?;

    Ok(Json(ResourceListResponse {
        resources: resources.into_iter().map(Into::into).collect(),
    }))
}

#[derive(Serialize)]
pub struct CreateResourceResponse {
    pub id: String,
}

/// Create a resource. Initial collection assignments commit atomically
/// with the resource itself.
async fn create_resource(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<NewResource>,
) -> Result<Json<CreateResourceResponse>> {
    let resource = state.resources.create(&user.user_id, body).await?;
    Ok(Json(CreateResourceResponse { id: resource.id }))
}

#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Partial update; a supplied `collection_ids` replaces the resource's
/// full collection assignment.
async fn update_resource(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(body): Json<ResourceUpdate>,
) -> Result<Json<SuccessResponse>> {
    state.resources.update(&user.user_id, &id, body).await?;
    Ok(Json(SuccessResponse { success: true }))
}

/// Delete a resource and its memberships.
async fn delete_resource(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>> {
    state.resources.delete(&user.user_id, &id).await?;
    Ok(Json(SuccessResponse { success: true }))
}
