// SPDX-License-Identifier: MIT

//! End-to-end flow over the HTTP surface: sign up, submit, unlock the feed.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use chrono::Utc;
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::{body_json, create_test_app, seed_prompt};
use oncue_api::store::PromptStore;

async fn get(
    app: &axum::Router,
    uri: &str,
    token: &str,
) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(uri)
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    (status, body_json(response).await)
}

async fn post_json(
    app: &axum::Router,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let response = app
        .clone()
        .oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap();
    let status = response.status();
    (status, body_json(response).await)
}

async fn signup(app: &axum::Router, username: &str, email: &str) -> String {
    let (status, json) = post_json(
        app,
        "/auth/signup",
        None,
        json!({"username": username, "email": email, "password": "hunter2hunter2"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "signup failed: {}", json);
    json["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_signup_submit_unlock_flow() {
    let (app, _, store) = create_test_app();
    let today = Utc::now().date_naive();
    store.upsert_prompt(&seed_prompt("p1", today)).await.unwrap();

    let token = signup(&app, "maria", "maria@example.com").await;

    // Feed is locked before posting, no matter what.
    let (status, feed) = get(&app, "/api/feed", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(feed["status"], "locked");

    // Today's prompt is served.
    let (status, prompt) = get(&app, "/api/prompt", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(prompt["id"], "p1");

    // Submit a response.
    let (status, submission) = post_json(
        &app,
        "/api/posts",
        Some(&token),
        json!({"prompt_id": "p1", "text_content": "fresh coffee"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(submission["post"]["text_content"], "fresh coffee");
    assert_eq!(submission["streak"]["current_streak"], 1);

    // Sole poster still unlocks: one post, not locked.
    let (status, feed) = get(&app, "/api/feed", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(feed["status"], "unlocked");
    assert_eq!(feed["posts"].as_array().unwrap().len(), 1);
    assert_eq!(feed["posts"][0]["username"], "maria");

    // Profile merges the streak.
    let (status, profile) = get(&app, "/api/me", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["current_streak"], 1);
    assert_eq!(profile["last_post_date"], today.to_string());

    // History lists the post.
    let (status, posts) = get(&app, "/api/me/posts", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(posts.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_feed_stays_locked_for_non_participants() {
    let (app, _, store) = create_test_app();
    let today = Utc::now().date_naive();
    store.upsert_prompt(&seed_prompt("p1", today)).await.unwrap();

    let maria = signup(&app, "maria", "maria@example.com").await;
    let noah = signup(&app, "noah", "noah@example.com").await;

    // Maria posts; Noah still sees a locked feed.
    let (status, _) = post_json(
        &app,
        "/api/posts",
        Some(&maria),
        json!({"prompt_id": "p1", "text_content": "sunrise"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, feed) = get(&app, "/api/feed", &noah).await;
    assert_eq!(feed["status"], "locked");

    // Once Noah posts, the feed opens with both posts, newest first.
    let (status, _) = post_json(
        &app,
        "/api/posts",
        Some(&noah),
        json!({"prompt_id": "p1", "text_content": "late lunch"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, feed) = get(&app, "/api/feed", &noah).await;
    assert_eq!(feed["status"], "unlocked");
    let posts = feed["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0]["username"], "noah");
    assert_eq!(posts[1]["username"], "maria");
}

#[tokio::test]
async fn test_feed_rejects_malformed_date() {
    let (app, _, _) = create_test_app();
    let token = signup(&app, "maria", "maria@example.com").await;

    let (status, json) = get(&app, "/api/feed?date=not-a-date", &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "bad_request");
}

#[tokio::test]
async fn test_prompt_missing_for_date_is_not_found() {
    let (app, _, _) = create_test_app();
    let token = signup(&app, "maria", "maria@example.com").await;

    let (status, json) = get(&app, "/api/prompt?date=1999-01-01", &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "not_found");
}

#[tokio::test]
async fn test_submitting_to_unknown_prompt_is_not_found() {
    let (app, _, _) = create_test_app();
    let token = signup(&app, "maria", "maria@example.com").await;

    let (status, _) = post_json(
        &app,
        "/api/posts",
        Some(&token),
        json!({"prompt_id": "nope", "text_content": "hello"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_roll_respects_exclusions_with_fallback() {
    let (app, _, store) = create_test_app();
    let today = Utc::now().date_naive();
    store.upsert_prompt(&seed_prompt("p1", today)).await.unwrap();
    store.upsert_prompt(&seed_prompt("p2", today)).await.unwrap();
    store.upsert_prompt(&seed_prompt("p3", today)).await.unwrap();

    let token = signup(&app, "maria", "maria@example.com").await;

    // Only p3 remains after exclusion.
    let (status, prompt) = get(&app, "/api/prompts/roll?exclude=p1,p2", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(prompt["id"], "p3");

    // Excluding everything falls back to the full pool.
    let (status, prompt) = get(&app, "/api/prompts/roll?exclude=p1,p2,p3", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert!(["p1", "p2", "p3"].contains(&prompt["id"].as_str().unwrap()));
}

#[tokio::test]
async fn test_roll_with_no_prompts_is_not_found() {
    let (app, _, _) = create_test_app();
    let token = signup(&app, "maria", "maria@example.com").await;

    let (status, _) = get(&app, "/api/prompts/roll", &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
