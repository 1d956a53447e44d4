// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Admin privileges required")]
    Permission,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Submission already reviewed: {0}")]
    InvalidState(String),

    #[error("Identity gateway error: {0}")]
    IdentityApi(String),

    #[error("Object store error: {0}")]
    Storage(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Build a validation error naming the first violated field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Gateway error marker for bad email/password pairs.
    pub const INVALID_CREDENTIALS: &'static str = "invalid_credentials";
    /// Gateway error marker for unconfirmed accounts.
    pub const EMAIL_NOT_CONFIRMED: &'static str = "email_not_confirmed";
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, field, details) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None, None),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token", None, None),
            AppError::Permission => (StatusCode::FORBIDDEN, "access_denied", None, None),
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, "not_found", None, Some(msg.clone()))
            }
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                "bad_request",
                None,
                Some(msg.clone()),
            ),
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                Some(field.clone()),
                Some(message.clone()),
            ),
            AppError::InvalidState(msg) => (
                StatusCode::CONFLICT,
                "invalid_state",
                None,
                Some(msg.clone()),
            ),
            AppError::IdentityApi(msg) => {
                // Credential failures belong to the caller, not the gateway
                if msg == AppError::INVALID_CREDENTIALS || msg == AppError::EMAIL_NOT_CONFIRMED {
                    (
                        StatusCode::UNAUTHORIZED,
                        "auth_error",
                        None,
                        Some(msg.clone()),
                    )
                } else {
                    tracing::error!(error = %msg, "Identity gateway error");
                    (StatusCode::BAD_GATEWAY, "identity_error", None, None)
                }
            }
            AppError::Storage(msg) => {
                tracing::error!(error = %msg, "Object store error");
                (StatusCode::BAD_GATEWAY, "storage_error", None, None)
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    None,
                    None,
                )
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    None,
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            field,
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
