// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod collection;
pub mod enrichment;
pub mod membership;
pub mod profile;
pub mod resource;

pub use collection::CollectionService;
pub use enrichment::{EnrichmentService, UrlMetadata};
pub use membership::MembershipService;
pub use profile::ProfileService;
pub use resource::ResourceService;
