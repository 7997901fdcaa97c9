// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User profile management.
//!
//! Profiles are created on first successful sign-in; the identity provider
//! issues the user id and this layer only stores what hangs off it.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::User;
use serde::Deserialize;

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 20;

/// Fields for creating or replacing a profile.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertProfile {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub share_by_default: Option<bool>,
}

/// Partial update of a profile.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub share_by_default: Option<bool>,
}

/// Profile store operations.
#[derive(Clone)]
pub struct ProfileService {
    db: FirestoreDb,
}

impl ProfileService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Get a profile by user id.
    pub async fn get(&self, user_id: &str) -> Result<User> {
        self.db
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
    }

    /// Create or update the caller's profile.
    ///
    /// Preserves `created_at` when the profile already exists.
    pub async fn upsert(&self, user_id: &str, fields: UpsertProfile) -> Result<User> {
        validate_username(&fields.username)?;
        if fields.email.trim().is_empty() {
            return Err(AppError::Validation(
                "Missing required field: email".to_string(),
            ));
        }
        self.ensure_username_free(user_id, &fields.username).await?;

        let existing = self.db.get_user(user_id).await?;
        let now = chrono::Utc::now();

        let user = User {
            id: user_id.to_string(),
            username: fields.username,
            email: fields.email,
            share_by_default: fields.share_by_default.unwrap_or(false),
            created_at: existing.map(|u| u.created_at).unwrap_or(now),
            updated_at: now,
        };

        self.db.upsert_user(&user).await?;
        Ok(user)
    }

    /// Partial update of the caller's profile.
    pub async fn update(&self, user_id: &str, update: ProfileUpdate) -> Result<User> {
        if let Some(username) = &update.username {
            validate_username(username)?;
        }

        let mut user = self.get(user_id).await?;

        if let Some(username) = update.username {
            self.ensure_username_free(user_id, &username).await?;
            user.username = username;
        }
        if let Some(share_by_default) = update.share_by_default {
            user.share_by_default = share_by_default;
        }
        user.updated_at = chrono::Utc::now();

        self.db.upsert_user(&user).await?;
        Ok(user)
    }

    /// Whether a username is free for the given user to take.
    pub async fn username_available(&self, user_id: &str, username: &str) -> Result<bool> {
        validate_username(username)?;
        let holders = self.db.find_users_by_username(username).await?;
        Ok(holders.iter().all(|u| u.id == user_id))
    }

    /// Read-then-write uniqueness pre-check.
    ///
    /// Known race: Firestore has no unique secondary index, so two
    /// concurrent signups with the same username can both pass this check.
    async fn ensure_username_free(&self, user_id: &str, username: &str) -> Result<()> {
        let holders = self.db.find_users_by_username(username).await?;
        if holders.iter().any(|u| u.id != user_id) {
            return Err(AppError::Conflict("Username is already taken".to_string()));
        }
        Ok(())
    }
}

/// Usernames are 3-20 chars of lowercase letters, digits, underscores, or
/// hyphens.
pub fn validate_username(username: &str) -> Result<()> {
    let len_ok = (USERNAME_MIN..=USERNAME_MAX).contains(&username.len());
    let chars_ok = username
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');

    if len_ok && chars_ok {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "Username must be {}-{} characters, lowercase letters, numbers, underscores, or hyphens only",
            USERNAME_MIN, USERNAME_MAX
        )))
    }
}
