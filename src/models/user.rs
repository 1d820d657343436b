//! User model for storage.

use serde::{Deserialize, Serialize};

/// User profile stored in the `users` collection.
///
/// Streak state lives in its own `streaks/{uid}` document so that the
/// per-post transaction only ever touches the streak record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// User ID (also used as document ID)
    pub uid: String,
    /// Display name shown on posts
    pub username: String,
    /// Email address (unique, used for sign-in)
    pub email: String,
    /// Argon2 PHC string; never exposed through the API
    pub password_hash: String,
    /// Profile picture URL
    pub profile_picture_url: Option<String>,
    /// When the account was created (RFC3339)
    pub created_at: String,
}
