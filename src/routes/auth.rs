// SPDX-License-Identifier: MIT

//! Account routes: sign-up and sign-in with password sessions.

use axum::{extract::State, routing::post, Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, SESSION_COOKIE};
use crate::models::User;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use argon2::password_hash::{rand_core::OsRng, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/signin", post(signin))
}

#[derive(Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 3, max = 24, message = "username must be 3-24 characters"))]
    pub username: String,
    #[validate(email(message = "invalid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

/// Public view of an account, returned on sign-up/sign-in.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/lib/generated/")
)]
pub struct AccountResponse {
    pub uid: String,
    pub username: String,
    pub email: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/lib/generated/")
)]
pub struct AuthResponse {
    pub token: String,
    pub user: AccountResponse,
}

/// Create an account and start a session.
async fn signup(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<SignupRequest>,
) -> Result<(CookieJar, Json<AuthResponse>)> {
    req.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    if state.store.find_user_by_email(&req.email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let user = User {
        uid: uuid::Uuid::new_v4().to_string(),
        username: req.username,
        email: req.email,
        password_hash: hash_password(&req.password)?,
        profile_picture_url: None,
        created_at: format_utc_rfc3339(chrono::Utc::now()),
    };

    state.store.upsert_user(&user).await?;

    tracing::info!(uid = %user.uid, "Account created");

    session_response(&state, jar, user)
}

/// Verify credentials and start a session.
///
/// Unknown email and wrong password are the same failure; the response
/// never says which half was wrong.
async fn signin(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<SigninRequest>,
) -> Result<(CookieJar, Json<AuthResponse>)> {
    let user = state
        .store
        .find_user_by_email(&req.email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    verify_password(&req.password, &user.password_hash)?;

    tracing::info!(uid = %user.uid, "Signed in");

    session_response(&state, jar, user)
}

/// Issue a JWT, set the session cookie, and build the auth response.
fn session_response(
    state: &Arc<AppState>,
    jar: CookieJar,
    user: User,
) -> Result<(CookieJar, Json<AuthResponse>)> {
    let token = create_jwt(&user.uid, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    let cookie = Cookie::build((SESSION_COOKIE, token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    Ok((
        jar.add(cookie),
        Json(AuthResponse {
            token,
            user: AccountResponse {
                uid: user.uid,
                username: user.username,
                email: user.email,
            },
        }),
    ))
}

/// Hash a password into an argon2id PHC string for storage.
fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {}", e)))
}

/// Verify a password against a stored PHC string.
fn verify_password(password: &str, stored_hash: &str) -> Result<()> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Stored hash unreadable: {}", e)))?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AppError::Unauthorized)
}
