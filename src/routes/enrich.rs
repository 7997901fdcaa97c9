// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! URL metadata enrichment route.
//!
//! The frontend calls this while the user fills out the save form and
//! merges whatever comes back; resource writes never depend on it.

use crate::error::Result;
use crate::services::resource::validate_link;
use crate::services::UrlMetadata;
use crate::AppState;
use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/enrich", post(enrich))
}

#[derive(Deserialize)]
struct EnrichBody {
    url: String,
}

/// Scrape title/description/image from a URL, best-effort.
async fn enrich(
    State(state): State<Arc<AppState>>,
    Json(body): Json<EnrichBody>,
) -> Result<Json<UrlMetadata>> {
    // Same scheme rule as saved links; everything past validation is
    // best-effort and returns empty metadata on failure.
    validate_link(&body.url)?;

    let metadata = state.enrichment.fetch_metadata(&body.url).await;
    Ok(Json(metadata))
}
