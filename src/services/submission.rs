// SPDX-License-Identifier: MIT

//! Submission flow: persist a post, then record the streak.

use crate::error::{AppError, Result};
use crate::models::{Post, StreakState};
use crate::services::StreakTracker;
use crate::store::Store;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// A post submission as it arrives from the client. Media is already
/// uploaded by the client; only its URL travels through here.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub prompt_id: String,
    pub text_content: Option<String>,
    pub media_url: Option<String>,
}

/// Outcome of a submission. `streak` is absent when the streak update
/// failed; the post itself is still durably written.
#[derive(Debug, Clone)]
pub struct Submission {
    pub post: Post,
    pub streak: Option<StreakState>,
}

/// Handles post submissions end to end.
#[derive(Clone)]
pub struct SubmissionService {
    store: Arc<dyn Store>,
    streaks: StreakTracker,
}

impl SubmissionService {
    pub fn new(store: Arc<dyn Store>, streaks: StreakTracker) -> Self {
        Self { store, streaks }
    }

    /// Submit a response to a prompt on behalf of `user_id`.
    ///
    /// The post is written first and never reversed: if the streak update
    /// fails afterwards, the failure is logged and the submission still
    /// reports success, just without a streak snapshot.
    pub async fn submit(&self, user_id: &str, new_post: NewPost) -> Result<Submission> {
        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        let prompt = self
            .store
            .get_prompt(&new_post.prompt_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Prompt {} not found", new_post.prompt_id))
            })?;

        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4().to_string(),
            user_id: user.uid.clone(),
            username: user.username,
            prompt_id: prompt.id,
            prompt_text: prompt.text,
            prompt_type: prompt.prompt_type,
            // The prompt's day, not the submission instant, groups the feed.
            post_date: prompt.date,
            text_content: new_post.text_content,
            media_url: new_post.media_url,
            timestamp: now,
        };

        self.store.insert_post(&post).await?;

        tracing::info!(
            user_id,
            post_id = %post.id,
            post_date = %post.post_date,
            "Post submitted"
        );

        let streak = match self.streaks.record_post(user_id, now).await {
            Ok(state) => Some(state),
            Err(e) => {
                tracing::warn!(
                    user_id,
                    post_id = %post.id,
                    error = %e,
                    "Streak update failed after post was written"
                );
                None
            }
        };

        Ok(Submission { post, streak })
    }
}
