// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared feed routes: browse public resources and save copies.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::routes::resources::{CreateResourceResponse, ResourceListResponse};
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/feed", get(list_feed))
        .route("/api/feed/save", post(save_from_feed))
}

/// Public resources from other users, newest first.
async fn list_feed(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ResourceListResponse>> {
    let resources = state.resources.list_public_feed(&user.user_id).await?;

    Ok(Json(ResourceListResponse {
        resources: resources.into_iter().map(Into::into).collect(),
    }))
}

#[derive(Deserialize)]
struct SaveFromFeedBody {
    resource_id: String,
}

/// Copy a public resource into the caller's space as a new private one.
async fn save_from_feed(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<SaveFromFeedBody>,
) -> Result<Json<CreateResourceResponse>> {
    let copy = state
        .resources
        .save_from_feed(&user.user_id, &body.resource_id)
        .await?;
    Ok(Json(CreateResourceResponse { id: copy.id }))
}
