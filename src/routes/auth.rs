// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account routes: sign-up, sign-in, password reset.
//!
//! Credentials live with the hosted identity gateway; these handlers
//! validate input, relay to the gateway, keep the profile document in step,
//! and mint our own session JWT.

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_session_jwt, SESSION_COOKIE};
use crate::models::Profile;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{Json, State},
    routing::post,
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/signup", post(sign_up))
        .route("/auth/signin", post(sign_in))
        .route("/auth/reset-password", post(reset_password))
        .route("/auth/logout", post(logout))
}

// ─── Sign Up ─────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct SignUpRequest {
    #[validate(email(message = "invalid email address"), length(max = 255))]
    pub email: String,
    #[validate(length(min = 8, max = 100, message = "must be 8-100 characters"))]
    pub password: String,
    #[validate(custom(function = validate_username))]
    pub username: String,
    #[validate(length(max = 50, message = "must be under 50 characters"))]
    pub team_name: Option<String>,
}

/// Usernames: 3-30 chars, letters/digits/underscore only.
fn validate_username(username: &str) -> std::result::Result<(), validator::ValidationError> {
    let len = username.chars().count();
    if !(3..=30).contains(&len) {
        return Err(validator::ValidationError::new("length")
            .with_message("must be 3-30 characters".into()));
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(validator::ValidationError::new("charset")
            .with_message("only letters, numbers, and underscores".into()));
    }
    Ok(())
}

#[derive(Serialize)]
pub struct SignUpResponse {
    pub user_id: String,
    pub username: String,
    /// False when the gateway wants the email confirmed first
    pub confirmed: bool,
    /// Session token, present only when the account is usable right away
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Register a new account and create its profile.
async fn sign_up(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<SignUpRequest>,
) -> Result<(CookieJar, Json<SignUpResponse>)> {
    req.validate().map_err(first_validation_error)?;

    let email = req.email.trim().to_lowercase();

    if state.db.username_exists(&req.username).await? {
        return Err(AppError::validation("username", "already taken"));
    }

    let identity_user = state
        .identity
        .sign_up(&email, &req.password, &req.username)
        .await?;

    let now = format_utc_rfc3339(chrono::Utc::now());
    let profile = Profile::new(
        identity_user.id.clone(),
        email,
        req.username.clone(),
        req.team_name.filter(|t| !t.trim().is_empty()),
        &now,
    );
    state.db.upsert_profile(&profile).await?;

    tracing::info!(
        user_id = %identity_user.id,
        username = %req.username,
        confirmed = identity_user.is_confirmed(),
        "Account created"
    );

    let confirmed = identity_user.is_confirmed();
    let (jar, token) = if confirmed {
        let token = create_session_jwt(&identity_user.id, &state.config.jwt_signing_key)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;
        (jar.add(session_cookie(token.clone())), Some(token))
    } else {
        (jar, None)
    };

    Ok((
        jar,
        Json(SignUpResponse {
            user_id: identity_user.id,
            username: req.username,
            confirmed,
            token,
        }),
    ))
}

// ─── Sign In ─────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct SignInRequest {
    #[validate(email(message = "invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}

#[derive(Serialize)]
pub struct SignInResponse {
    pub user_id: String,
    pub username: Option<String>,
    pub token: String,
}

/// Exchange email/password for a session.
async fn sign_in(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<SignInRequest>,
) -> Result<(CookieJar, Json<SignInResponse>)> {
    req.validate().map_err(first_validation_error)?;

    let email = req.email.trim().to_lowercase();
    let signed_in = state.identity.sign_in(&email, &req.password).await?;

    let profile = state.db.get_profile(&signed_in.user.id).await?;

    let token = create_session_jwt(&signed_in.user.id, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    tracing::info!(user_id = %signed_in.user.id, "Signed in");

    Ok((
        jar.add(session_cookie(token.clone())),
        Json(SignInResponse {
            user_id: signed_in.user.id,
            username: profile.map(|p| p.username),
            token,
        }),
    ))
}

// ─── Password Reset ──────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(email(message = "invalid email address"))]
    pub email: String,
}

#[derive(Serialize)]
pub struct ResetPasswordResponse {
    pub success: bool,
}

/// Fire a reset mail through the gateway.
///
/// Gateway rejections for unknown accounts are swallowed so the endpoint
/// is not an account-existence oracle; only gateway outages surface.
async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<ResetPasswordResponse>> {
    req.validate().map_err(first_validation_error)?;

    let email = req.email.trim().to_lowercase();
    let redirect_to = format!("{}/", state.config.frontend_url);

    match state.identity.reset_password(&email, &redirect_to).await {
        Ok(()) => {}
        Err(AppError::BadRequest(msg)) => {
            tracing::debug!(error = %msg, "Reset request rejected by gateway");
        }
        Err(e) => return Err(e),
    }

    Ok(Json(ResetPasswordResponse { success: true }))
}

// ─── Logout ──────────────────────────────────────────────────

/// Clear the session cookie.
async fn logout(jar: CookieJar) -> (CookieJar, Json<serde_json::Value>) {
    (
        jar.remove(Cookie::from(SESSION_COOKIE)),
        Json(serde_json::json!({ "success": true })),
    )
}

// ─── Helpers ─────────────────────────────────────────────────

fn session_cookie(token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie
}

/// Reduce a `validator` report to an `AppError` naming the first field.
pub fn first_validation_error(errors: validator::ValidationErrors) -> AppError {
    for (field, kind) in errors.errors() {
        if let validator::ValidationErrorsKind::Field(list) = kind {
            if let Some(first) = list.first() {
                let message = first
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| first.code.to_string());
                return AppError::validation(field.to_string(), message);
            }
        }
    }
    AppError::BadRequest("invalid request".to_string())
}
