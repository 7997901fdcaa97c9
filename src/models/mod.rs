// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod collection;
pub mod resource;
pub mod user;

pub use collection::Collection;
pub use resource::{Membership, Resource};
pub use user::{ResourceStats, User};
