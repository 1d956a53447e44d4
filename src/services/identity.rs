// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity gateway client.
//!
//! Talks to the hosted email/password auth provider. The provider owns the
//! credential store, confirmation mails, and password resets; this client
//! only shuttles requests and maps its error vocabulary onto ours.

use crate::error::AppError;
use serde::Deserialize;

/// Identity gateway client.
#[derive(Clone)]
pub struct IdentityClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl IdentityClient {
    /// Create a new client against the gateway base URL.
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }

    /// Register a new account.
    ///
    /// The username travels as signup metadata so the provider echoes it
    /// back in the account record. Depending on gateway configuration the
    /// account may require email confirmation before sign-in works.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        username: &str,
    ) -> Result<IdentityUser, AppError> {
        let url = format!("{}/auth/v1/signup", self.base_url);

        let body = serde_json::json!({
            "email": email,
            "password": password,
            "data": { "username": username },
        });

        let response = self
            .http
            .post(&url)
            .header("apikey", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::IdentityApi(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Exchange email/password for a gateway session.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SignInResult, AppError> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.base_url);

        let body = serde_json::json!({
            "email": email,
            "password": password,
        });

        let response = self
            .http
            .post(&url)
            .header("apikey", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::IdentityApi(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Trigger a password-reset mail.
    ///
    /// The redirect origin is fixed server-side so reset links cannot be
    /// pointed at arbitrary hosts.
    pub async fn reset_password(&self, email: &str, redirect_to: &str) -> Result<(), AppError> {
        let url = format!("{}/auth/v1/recover", self.base_url);

        let body = serde_json::json!({
            "email": email,
            "redirect_to": redirect_to,
        });

        let response = self
            .http
            .post(&url)
            .header("apikey", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::IdentityApi(e.to_string()))?;

        self.check_response(response).await
    }

    /// Check response status and return error if not successful.
    async fn check_response(&self, response: reqwest::Response) -> Result<(), AppError> {
        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(map_gateway_error(status.as_u16(), &body))
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(map_gateway_error(status.as_u16(), &body));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::IdentityApi(format!("JSON parse error: {}", e)))
    }
}

/// Map the gateway's error vocabulary onto `AppError`.
///
/// The gateway reports credential problems as 400s with a message; anything
/// else is treated as a gateway failure.
fn map_gateway_error(status: u16, body: &str) -> AppError {
    if status == 400 || status == 401 || status == 422 {
        if body.contains("Invalid login credentials") {
            return AppError::IdentityApi(AppError::INVALID_CREDENTIALS.to_string());
        }
        if body.contains("Email not confirmed") {
            return AppError::IdentityApi(AppError::EMAIL_NOT_CONFIRMED.to_string());
        }
        return AppError::BadRequest(format!("Identity gateway rejected request: {}", body));
    }

    AppError::IdentityApi(format!("HTTP {}: {}", status, body))
}

/// Account record returned by the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityUser {
    /// Subject id; our profile documents are keyed by this
    pub id: String,
    pub email: String,
    /// Set once the account's email is confirmed
    pub email_confirmed_at: Option<String>,
}

impl IdentityUser {
    pub fn is_confirmed(&self) -> bool {
        self.email_confirmed_at.is_some()
    }
}

/// Successful password sign-in.
#[derive(Debug, Clone, Deserialize)]
pub struct SignInResult {
    /// Gateway access token (not used as our session token)
    pub access_token: String,
    pub user: IdentityUser,
}
