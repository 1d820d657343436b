// SPDX-License-Identifier: MIT

//! Feed gate: the daily feed is visible only to users who posted that day.

use crate::error::{AppError, Result};
use crate::models::Post;
use crate::store::Store;
use chrono::NaiveDate;
use std::sync::Arc;

/// Outcome of a feed evaluation.
///
/// `Locked` is a normal result, not an error; store failures surface as
/// errors so a broken listing is never mistaken for a locked feed.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedState {
    Locked,
    Unlocked(Vec<Post>),
}

/// Decides whether a viewer may see the shared feed for a given day.
#[derive(Clone)]
pub struct FeedGate {
    store: Arc<dyn Store>,
}

impl FeedGate {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Evaluate the gate for `viewer_id` on `date`.
    ///
    /// The existence probe is the sole gating predicate. When the viewer has
    /// not posted, no listing query is issued at all, so feed contents never
    /// leak to non-participants. Read-only; the two queries are independent
    /// and a post committing between them may or may not appear.
    pub async fn evaluate(&self, viewer_id: &str, date: NaiveDate) -> Result<FeedState> {
        if viewer_id.trim().is_empty() {
            return Err(AppError::Unauthorized);
        }

        if !self.store.user_posted_on(viewer_id, date).await? {
            tracing::debug!(viewer_id, %date, "Feed locked, viewer has not posted");
            return Ok(FeedState::Locked);
        }

        let posts = self.store.posts_for_date(date).await?;
        tracing::debug!(viewer_id, %date, count = posts.len(), "Feed unlocked");

        Ok(FeedState::Unlocked(posts))
    }
}
