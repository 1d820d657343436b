// SPDX-License-Identifier: MIT

//! Post model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A user's response to a prompt, stored in the `posts` collection.
///
/// Immutable once written. `post_date` is the grouping key for the daily
/// feed and comes from the prompt, not from the submission instant, so a
/// late-night submission still lands on the prompt's day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Writer-chosen UUID (also used as document ID)
    pub id: String,
    /// Author's user ID
    pub user_id: String,
    /// Author's username, denormalized at submission time
    pub username: String,
    /// The prompt this post answers
    pub prompt_id: String,
    /// Prompt text, denormalized so the feed renders without a join
    pub prompt_text: String,
    /// One of WRITTEN / UPLOAD / SNAPSHOT
    pub prompt_type: String,
    /// Calendar day this post belongs to (YYYY-MM-DD)
    pub post_date: NaiveDate,
    /// Written response, if any
    pub text_content: Option<String>,
    /// Uploaded/captured media URL, if any
    pub media_url: Option<String>,
    /// Creation instant
    pub timestamp: DateTime<Utc>,
}
