// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use linkstash::config::Config;
use linkstash::db::FirestoreDb;
use linkstash::routes::create_router;
use linkstash::services::{
    CollectionService, EnrichmentService, MembershipService, ProfileService, ResourceService,
};
use linkstash::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Build the service layer over a given database connection.
#[allow(dead_code)]
pub fn build_state(db: FirestoreDb) -> Arc<AppState> {
    let config = Config::test_default();
    let memberships = MembershipService::new(db.clone());

    Arc::new(AppState {
        profiles: ProfileService::new(db.clone()),
        resources: ResourceService::new(db.clone(), memberships.clone()),
        collections: CollectionService::new(db.clone()),
        memberships,
        enrichment: EnrichmentService::new().expect("Failed to build enrichment service"),
        config,
        db,
    })
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let state = build_state(test_db_offline());
    (create_router(state.clone()), state)
}

/// Mint a session token the way the auth flow would.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str) -> String {
    let config = Config::test_default();
    linkstash::middleware::auth::create_jwt(user_id, &config.jwt_signing_key)
        .expect("Failed to create test JWT")
}
