// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile and stats routes for the authenticated user.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{ResourceStats, User};
use crate::services::profile::{ProfileUpdate, UpsertProfile};
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Profile routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/profile",
            get(get_profile).post(upsert_profile).put(update_profile),
        )
        .route("/api/profile/stats", get(get_stats))
        .route("/api/check-username", get(check_username))
}

/// Profile response sent to the frontend.
#[derive(Serialize)]
pub struct ProfileResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub share_by_default: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            share_by_default: user.share_by_default,
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.to_rfc3339(),
        }
    }
}

/// Get current user's profile.
async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ProfileResponse>> {
    let profile = state.profiles.get(&user.user_id).await?;
    Ok(Json(profile.into()))
}

/// Create or replace the current user's profile (first sign-in flow).
async fn upsert_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<UpsertProfile>,
) -> Result<Json<ProfileResponse>> {
    let profile = state.profiles.upsert(&user.user_id, body).await?;
    Ok(Json(profile.into()))
}

/// Partial update of the current user's profile.
async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<ProfileUpdate>,
) -> Result<Json<ProfileResponse>> {
    let profile = state.profiles.update(&user.user_id, body).await?;
    Ok(Json(profile.into()))
}

/// Get resource counts for the current user.
///
/// Recomputed from the resource store on every call; no cached aggregate.
async fn get_stats(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ResourceStats>> {
    let stats = state.resources.stats(&user.user_id).await?;
    Ok(Json(stats))
}

#[derive(Deserialize)]
struct CheckUsernameQuery {
    username: String,
}

#[derive(Serialize)]
pub struct CheckUsernameResponse {
    pub available: bool,
}

/// Availability probe for the signup form.
async fn check_username(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<CheckUsernameQuery>,
) -> Result<Json<CheckUsernameResponse>> {
    let available = state
        .profiles
        .username_available(&user.user_id, &params.username)
        .await?;
    Ok(Json(CheckUsernameResponse { available }))
}
