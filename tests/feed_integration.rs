// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared feed and stats integration tests.
//!
//! These tests require the Firestore emulator to be running.
//! Run with: ./scripts/test-with-emulator.sh

use linkstash::error::AppError;
use linkstash::services::resource::NewResource;
use linkstash::AppState;
use std::sync::Arc;

mod common;
use common::{build_state, test_db};

fn unique_user_id() -> String {
    format!("user-{}", uuid::Uuid::new_v4())
}

async fn seed_resource(state: &Arc<AppState>, owner_id: &str, title: &str, is_public: bool) -> String {
    state
        .resources
        .create(
            owner_id,
            NewResource {
                title: title.to_string(),
                link: format!("https://example.com/{}", uuid::Uuid::new_v4()),
                tag: "article".to_string(),
                note: Some("a note".to_string()),
                is_public: Some(is_public),
                collection_ids: None,
            },
        )
        .await
        .expect("Failed to create resource")
        .id
}

#[tokio::test]
async fn test_feed_excludes_requester_and_private() {
    require_emulator!();

    let state = build_state(test_db().await);
    let publisher = unique_user_id();
    let reader = unique_user_id();

    let p1 = seed_resource(&state, &publisher, "Public one", true).await;
    let p2 = seed_resource(&state, &publisher, "Public two", true).await;
    let _hidden = seed_resource(&state, &publisher, "Private", false).await;
    let _own = seed_resource(&state, &reader, "Reader's own public", true).await;

    let feed = state.resources.list_public_feed(&reader).await.unwrap();

    // The emulator is shared across tests, so filter to this publisher
    let from_publisher: Vec<_> = feed.iter().filter(|r| r.owner_id == publisher).collect();
    assert_eq!(from_publisher.len(), 2);

    let ids: Vec<&str> = from_publisher.iter().map(|r| r.id.as_str()).collect();
    assert!(ids.contains(&p1.as_str()));
    assert!(ids.contains(&p2.as_str()));

    assert!(
        feed.iter().all(|r| r.owner_id != reader),
        "Feed must not show the requester's own resources"
    );
    assert!(feed.iter().all(|r| r.is_public));
}

#[tokio::test]
async fn test_save_from_feed_creates_private_copy() {
    require_emulator!();

    let state = build_state(test_db().await);
    let publisher = unique_user_id();
    let reader = unique_user_id();

    let source_id = seed_resource(&state, &publisher, "Worth keeping", true).await;

    let copy = state
        .resources
        .save_from_feed(&reader, &source_id)
        .await
        .unwrap();

    assert_ne!(copy.id, source_id, "Copy must be a new document");
    assert_eq!(copy.owner_id, reader);
    assert_eq!(copy.title, "Worth keeping");
    assert!(!copy.is_public, "Copies are always private");
    assert!(copy.collection_ids.is_empty());

    // The source is untouched
    let source = state.resources.get(&publisher, &source_id).await.unwrap();
    assert!(source.is_public);
}

#[tokio::test]
async fn test_save_from_feed_rejects_duplicate_link() {
    require_emulator!();

    let state = build_state(test_db().await);
    let publisher = unique_user_id();
    let reader = unique_user_id();

    let source_id = seed_resource(&state, &publisher, "Once only", true).await;

    state
        .resources
        .save_from_feed(&reader, &source_id)
        .await
        .unwrap();

    let err = state
        .resources
        .save_from_feed(&reader, &source_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)), "got {:?}", err);

    // No second copy was written
    let resources = state.resources.list(&reader, None).await.unwrap();
    assert_eq!(resources.len(), 1);
}

#[tokio::test]
async fn test_save_from_feed_rejects_private_source() {
    require_emulator!();

    let state = build_state(test_db().await);
    let publisher = unique_user_id();
    let reader = unique_user_id();

    let private_id = seed_resource(&state, &publisher, "Not for you", false).await;

    let err = state
        .resources
        .save_from_feed(&reader, &private_id)
        .await
        .unwrap_err();
    assert!(
        matches!(err, AppError::NotFound(_)),
        "Private sources must look absent, got {:?}",
        err
    );
}

#[tokio::test]
async fn test_stats_count_public_and_private() {
    require_emulator!();

    let state = build_state(test_db().await);
    let owner = unique_user_id();

    for i in 0..3 {
        seed_resource(&state, &owner, &format!("Private {}", i), false).await;
    }
    for i in 0..2 {
        seed_resource(&state, &owner, &format!("Public {}", i), true).await;
    }

    let stats = state.resources.stats(&owner).await.unwrap();
    assert_eq!(stats.total, 5);
    assert_eq!(stats.public, 2);
    assert_eq!(stats.private, 3);
}

#[tokio::test]
async fn test_stats_empty_user() {
    require_emulator!();

    let state = build_state(test_db().await);
    let stats = state.resources.stats(&unique_user_id()).await.unwrap();

    assert_eq!(stats.total, 0);
    assert_eq!(stats.public, 0);
    assert_eq!(stats.private, 0);
}
