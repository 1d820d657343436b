// SPDX-License-Identifier: MIT

//! API routes for authenticated users.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{DailyPrompt, Post, StreakState};
use crate::services::{FeedState, NewPost};
use crate::time_utils::{format_utc_rfc3339, parse_client_date, today_utc};
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::NaiveDate;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/me/posts", get(get_my_posts))
        .route("/api/prompt", get(get_prompt))
        .route("/api/prompts/roll", get(roll_prompt))
        .route("/api/feed", get(get_feed))
        .route("/api/posts", post(create_post))
}

/// Resolve an optional `?date=YYYY-MM-DD` query parameter, defaulting to
/// the current UTC day. Clients on a different local day boundary pass
/// their date explicitly.
fn resolve_date(raw: Option<&str>) -> Result<NaiveDate> {
    match raw {
        Some(s) => parse_client_date(s),
        None => Ok(today_utc()),
    }
}

// ─── Shared response shapes ──────────────────────────────────

#[derive(Serialize, Clone, Debug)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/lib/generated/")
)]
pub struct PostResponse {
    pub id: String,
    pub user_id: String,
    pub username: String,
    pub prompt_id: String,
    pub prompt_text: String,
    pub prompt_type: String,
    pub post_date: String,
    pub text_content: Option<String>,
    pub media_url: Option<String>,
    pub timestamp: String,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            user_id: post.user_id,
            username: post.username,
            prompt_id: post.prompt_id,
            prompt_text: post.prompt_text,
            prompt_type: post.prompt_type,
            post_date: post.post_date.to_string(),
            text_content: post.text_content,
            media_url: post.media_url,
            timestamp: format_utc_rfc3339(post.timestamp),
        }
    }
}

#[derive(Serialize, Clone, Debug)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/lib/generated/")
)]
pub struct StreakResponse {
    pub current_streak: u32,
    pub last_post_date: Option<String>,
}

impl From<StreakState> for StreakResponse {
    fn from(state: StreakState) -> Self {
        Self {
            current_streak: state.current_streak,
            last_post_date: state.last_post_date.map(|d| d.to_string()),
        }
    }
}

// ─── User Profile ────────────────────────────────────────────

/// Current user profile, merged with streak state.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/lib/generated/")
)]
pub struct ProfileResponse {
    pub uid: String,
    pub username: String,
    pub email: String,
    pub profile_picture_url: Option<String>,
    pub created_at: String,
    pub current_streak: u32,
    pub last_post_date: Option<String>,
}

/// Get current user profile with streak.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ProfileResponse>> {
    let profile = state
        .store
        .get_user(&user.uid)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.uid)))?;

    // No streak document yet just means streak 0.
    let streak = state
        .store
        .streak_for_user(&user.uid)
        .await?
        .unwrap_or_default();

    Ok(Json(ProfileResponse {
        uid: profile.uid,
        username: profile.username,
        email: profile.email,
        profile_picture_url: profile.profile_picture_url,
        created_at: profile.created_at,
        current_streak: streak.current_streak,
        last_post_date: streak.last_post_date.map(|d| d.to_string()),
    }))
}

/// Get current user's post history, newest first.
async fn get_my_posts(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<PostResponse>>> {
    let posts = state.store.posts_for_user(&user.uid).await?;
    Ok(Json(posts.into_iter().map(PostResponse::from).collect()))
}

// ─── Prompts ─────────────────────────────────────────────────

#[derive(Deserialize)]
struct PromptQuery {
    /// Calendar date (YYYY-MM-DD); defaults to today UTC
    date: Option<String>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/lib/generated/")
)]
pub struct PromptResponse {
    pub id: String,
    pub text: String,
    pub subtext: String,
    pub date: String,
    pub prompt_type: String,
}

impl From<DailyPrompt> for PromptResponse {
    fn from(prompt: DailyPrompt) -> Self {
        // Normalize unknown stored types before they reach a client.
        let prompt_type = prompt.prompt_type().as_str().to_string();
        Self {
            id: prompt.id,
            text: prompt.text,
            subtext: prompt.subtext,
            date: prompt.date.to_string(),
            prompt_type,
        }
    }
}

/// Get the prompt for a date (default: today UTC).
async fn get_prompt(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PromptQuery>,
) -> Result<Json<PromptResponse>> {
    let date = resolve_date(params.date.as_deref())?;

    let prompt = state
        .store
        .prompt_for_date(date)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No prompt for {}", date)))?;

    Ok(Json(PromptResponse::from(prompt)))
}

#[derive(Deserialize)]
struct RollQuery {
    /// Comma-separated prompt IDs already seen this session
    exclude: Option<String>,
}

/// Pick a random prompt the client hasn't seen this session.
///
/// If the exclusion list empties the pool, fall back to the full pool;
/// the per-user roll budget is client-side state.
async fn roll_prompt(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<RollQuery>,
) -> Result<Json<PromptResponse>> {
    let prompts = state.store.list_prompts().await?;
    if prompts.is_empty() {
        return Err(AppError::NotFound("No prompts available".to_string()));
    }

    let excluded: Vec<&str> = params
        .exclude
        .as_deref()
        .unwrap_or("")
        .split(',')
        .filter(|s| !s.is_empty())
        .collect();

    let pool: Vec<&DailyPrompt> = prompts
        .iter()
        .filter(|p| !excluded.contains(&p.id.as_str()))
        .collect();

    let chosen = if pool.is_empty() {
        prompts.iter().collect::<Vec<_>>()
    } else {
        pool
    };

    let prompt = chosen
        .choose(&mut rand::thread_rng())
        .copied()
        .cloned()
        .ok_or_else(|| AppError::NotFound("No prompts available".to_string()))?;

    tracing::debug!(uid = %user.uid, prompt_id = %prompt.id, "Rolled prompt");

    Ok(Json(PromptResponse::from(prompt)))
}

// ─── Feed ────────────────────────────────────────────────────

#[derive(Deserialize)]
struct FeedQuery {
    /// Calendar date (YYYY-MM-DD); defaults to today UTC
    date: Option<String>,
}

/// Feed response: locked until the viewer has posted for the date.
#[derive(Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/lib/generated/")
)]
pub enum FeedResponse {
    Locked,
    Unlocked { posts: Vec<PostResponse> },
}

/// Get the shared feed for a date, gated on the viewer's own post.
async fn get_feed(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<FeedQuery>,
) -> Result<Json<FeedResponse>> {
    let date = resolve_date(params.date.as_deref())?;

    let response = match state.feed_gate.evaluate(&user.uid, date).await? {
        FeedState::Locked => FeedResponse::Locked,
        FeedState::Unlocked(posts) => FeedResponse::Unlocked {
            posts: posts.into_iter().map(PostResponse::from).collect(),
        },
    };

    Ok(Json(response))
}

// ─── Submissions ─────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, message = "prompt_id is required"))]
    pub prompt_id: String,
    #[validate(length(max = 2000, message = "text too long"))]
    pub text_content: Option<String>,
    pub media_url: Option<String>,
}

/// Submission response; `streak` is omitted when the streak update failed
/// (the post itself is still written).
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/lib/generated/")
)]
pub struct CreatePostResponse {
    pub post: PostResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streak: Option<StreakResponse>,
}

/// Submit a response to a prompt.
async fn create_post(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreatePostRequest>,
) -> Result<Json<CreatePostResponse>> {
    req.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let submission = state
        .submissions
        .submit(
            &user.uid,
            NewPost {
                prompt_id: req.prompt_id,
                text_content: req.text_content,
                media_url: req.media_url,
            },
        )
        .await?;

    Ok(Json(CreatePostResponse {
        post: PostResponse::from(submission.post),
        streak: submission.streak.map(StreakResponse::from),
    }))
}
