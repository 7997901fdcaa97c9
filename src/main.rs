// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! LinkStash API Server
//!
//! Multi-tenant backend for saving links, grouping them into collections,
//! and sharing public resources through the community feed.

use linkstash::{
    config::Config,
    db::FirestoreDb,
    services::{
        CollectionService, EnrichmentService, MembershipService, ProfileService, ResourceService,
    },
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting LinkStash API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    // Build services around the shared database handle
    let memberships = MembershipService::new(db.clone());
    let resources = ResourceService::new(db.clone(), memberships.clone());
    let collections = CollectionService::new(db.clone());
    let profiles = ProfileService::new(db.clone());
    let enrichment = EnrichmentService::new().expect("Failed to build enrichment HTTP client");

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        profiles,
        resources,
        collections,
        memberships,
        enrichment,
    });

    // Build router
    let app = linkstash::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("linkstash=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
