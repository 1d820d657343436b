// SPDX-License-Identifier: MIT

use chrono::NaiveDate;
use oncue_api::config::Config;
use oncue_api::models::{DailyPrompt, User};
use oncue_api::routes::create_router;
use oncue_api::store::{FirestoreDb, MemoryStore};
use oncue_api::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection against the emulator.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a test app over an in-memory store.
/// Returns the router, the shared state, and the store for seeding.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>, Arc<MemoryStore>) {
    let config = Config::default();
    let store = Arc::new(MemoryStore::new());
    let state = Arc::new(AppState::new(config, store.clone()));
    (create_router(state.clone()), state, store)
}

/// A seeded user with a throwaway password hash.
#[allow(dead_code)]
pub fn seed_user(uid: &str, username: &str) -> User {
    User {
        uid: uid.to_string(),
        username: username.to_string(),
        email: format!("{}@example.com", uid),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$dGVzdGhhc2g".to_string(),
        profile_picture_url: None,
        created_at: "2026-01-01T00:00:00Z".to_string(),
    }
}

#[allow(dead_code)]
pub fn seed_prompt(id: &str, date: NaiveDate) -> DailyPrompt {
    DailyPrompt {
        id: id.to_string(),
        text: "What made you smile today?".to_string(),
        subtext: "A few words is plenty".to_string(),
        date,
        prompt_type: "WRITTEN".to_string(),
    }
}

/// Create a session token the way the auth routes do.
#[allow(dead_code)]
pub fn test_jwt(uid: &str, signing_key: &[u8]) -> String {
    oncue_api::middleware::auth::create_jwt(uid, signing_key).expect("JWT creation failed")
}

/// Collect a response body into JSON.
#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    serde_json::from_slice(&bytes).expect("Response body was not JSON")
}
