// SPDX-License-Identifier: MIT

//! Firestore store implementation.
//!
//! Documents live in four collections:
//! - `users` (profile, keyed by uid)
//! - `prompts` (daily prompts)
//! - `posts` (append-only responses, grouped by `post_date`)
//! - `streaks` (per-user streak state, keyed by uid)
//!
//! Streak updates go through a Firestore transaction so concurrent
//! submissions by the same user never lose an update.

use crate::models::{DailyPrompt, Post, StreakState, User};
use crate::store::{collections, PostStore, PromptStore, StoreError, StoreResult, StreakStore};
use crate::store::{StreakUpdateFn, UserStore};
use async_trait::async_trait;
use chrono::NaiveDate;
use futures_util::StreamExt;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

fn unavailable<E: std::fmt::Display>(e: E) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

/// Classify a transaction commit failure.
///
/// Firestore reports optimistic-concurrency failures as ABORTED; everything
/// else is treated as the store being unavailable.
fn classify_commit_error<E: std::fmt::Display>(e: E) -> StoreError {
    let msg = e.to_string();
    if msg.to_ascii_lowercase().contains("aborted") {
        StoreError::Conflict
    } else {
        StoreError::Unavailable(msg)
    }
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> StoreResult<Self> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| unavailable(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> StoreResult<Self> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // ExternalJwtFunctionSource provides a dummy token without needing a
        // custom TokenSource implementation struct.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| unavailable(format!("Failed to connect to Firestore Emulator: {}", e)))?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> StoreResult<&firestore::FirestoreDb> {
        self.client
            .as_ref()
            .ok_or_else(|| StoreError::Unavailable("Database not connected (offline mode)".into()))
    }
}

#[async_trait]
impl PostStore for FirestoreDb {
    async fn insert_post(&self, post: &Post) -> StoreResult<()> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::POSTS)
            .document_id(&post.id)
            .object(post)
            .execute()
            .await
            .map_err(unavailable)?;
        Ok(())
    }

    async fn user_posted_on(&self, user_id: &str, date: NaiveDate) -> StoreResult<bool> {
        let user_id = user_id.to_string();
        let date = date.to_string();

        // Pure existence check: fetch at most one raw document, never decode.
        let docs = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::POSTS)
            .filter(move |q| {
                q.for_all([
                    q.field("user_id").eq(user_id.clone()),
                    q.field("post_date").eq(date.clone()),
                ])
            })
            .limit(1)
            .query()
            .await
            .map_err(unavailable)?;

        Ok(!docs.is_empty())
    }

    async fn posts_for_date(&self, date: NaiveDate) -> StoreResult<Vec<Post>> {
        let date_str = date.to_string();

        let stream = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::POSTS)
            .filter(move |q| q.for_all([q.field("post_date").eq(date_str.clone())]))
            .order_by([("timestamp", firestore::FirestoreQueryDirection::Descending)])
            .obj::<Post>()
            .stream_query_with_errors()
            .await
            .map_err(unavailable)?;

        // An undecodable document degrades that one post, not the whole feed.
        let posts = stream
            .filter_map(|res| async move {
                match res {
                    Ok(post) => Some(post),
                    Err(e) => {
                        tracing::warn!(error = %e, "Skipping undecodable post document");
                        None
                    }
                }
            })
            .collect::<Vec<Post>>()
            .await;

        Ok(posts)
    }

    async fn posts_for_user(&self, user_id: &str) -> StoreResult<Vec<Post>> {
        let user_id = user_id.to_string();

        let stream = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::POSTS)
            .filter(move |q| q.for_all([q.field("user_id").eq(user_id.clone())]))
            .order_by([("timestamp", firestore::FirestoreQueryDirection::Descending)])
            .obj::<Post>()
            .stream_query_with_errors()
            .await
            .map_err(unavailable)?;

        let posts = stream
            .filter_map(|res| async move {
                match res {
                    Ok(post) => Some(post),
                    Err(e) => {
                        tracing::warn!(error = %e, "Skipping undecodable post document");
                        None
                    }
                }
            })
            .collect::<Vec<Post>>()
            .await;

        Ok(posts)
    }
}

#[async_trait]
impl StreakStore for FirestoreDb {
    async fn streak_for_user(&self, user_id: &str) -> StoreResult<Option<StreakState>> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::STREAKS)
            .obj()
            .one(user_id)
            .await
            .map_err(unavailable)
    }

    async fn transact_streak(
        &self,
        user_id: &str,
        update: &StreakUpdateFn,
    ) -> StoreResult<StreakState> {
        let client = self.get_client()?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| unavailable(format!("Failed to begin transaction: {}", e)))?;

        // Read the current streak state; the transactional write below is
        // validated against concurrent commits, and a losing commit comes
        // back ABORTED for the tracker to retry with fresh data.
        let current: Option<StreakState> = client
            .fluent()
            .select()
            .by_id_in(collections::STREAKS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| unavailable(format!("Failed to read streak in transaction: {}", e)))?;

        let next = update(current);

        client
            .fluent()
            .update()
            .in_col(collections::STREAKS)
            .document_id(user_id)
            .object(&next)
            .add_to_transaction(&mut transaction)
            .map_err(|e| unavailable(format!("Failed to add streak to transaction: {}", e)))?;

        transaction.commit().await.map_err(classify_commit_error)?;

        tracing::debug!(
            user_id,
            current_streak = next.current_streak,
            "Streak transaction committed"
        );

        Ok(next)
    }
}

#[async_trait]
impl UserStore for FirestoreDb {
    async fn get_user(&self, uid: &str) -> StoreResult<Option<User>> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(uid)
            .await
            .map_err(unavailable)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let email = email.to_string();

        let users: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| q.for_all([q.field("email").eq(email.clone())]))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(unavailable)?;

        Ok(users.into_iter().next())
    }

    async fn upsert_user(&self, user: &User) -> StoreResult<()> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.uid)
            .object(user)
            .execute()
            .await
            .map_err(unavailable)?;
        Ok(())
    }
}

#[async_trait]
impl PromptStore for FirestoreDb {
    async fn get_prompt(&self, prompt_id: &str) -> StoreResult<Option<DailyPrompt>> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::PROMPTS)
            .obj()
            .one(prompt_id)
            .await
            .map_err(unavailable)
    }

    async fn prompt_for_date(&self, date: NaiveDate) -> StoreResult<Option<DailyPrompt>> {
        let date_str = date.to_string();

        let prompts: Vec<DailyPrompt> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::PROMPTS)
            .filter(move |q| q.for_all([q.field("date").eq(date_str.clone())]))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(unavailable)?;

        Ok(prompts.into_iter().next())
    }

    async fn list_prompts(&self) -> StoreResult<Vec<DailyPrompt>> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::PROMPTS)
            .obj()
            .query()
            .await
            .map_err(unavailable)
    }

    async fn upsert_prompt(&self, prompt: &DailyPrompt) -> StoreResult<()> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::PROMPTS)
            .document_id(&prompt.id)
            .object(prompt)
            .execute()
            .await
            .map_err(unavailable)?;
        Ok(())
    }
}
