// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! LinkStash: a personal save-for-later resource vault.
//!
//! This crate provides the backend API for saving links, organizing them
//! into collections, and browsing the shared feed of public resources.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::FirestoreDb;
use services::{
    CollectionService, EnrichmentService, MembershipService, ProfileService, ResourceService,
};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub profiles: ProfileService,
    pub resources: ResourceService,
    pub collections: CollectionService,
    pub memberships: MembershipService,
    pub enrichment: EnrichmentService,
}
