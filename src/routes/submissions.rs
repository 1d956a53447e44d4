// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Proof submission intake (multipart).

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::services::PhotoUpload;
use crate::AppState;
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

/// Multipart body ceiling: photo limit plus form-field headroom.
/// Oversized photos inside this ceiling still get the field-naming
/// validation error instead of a blunt 413.
const MAX_UPLOAD_BODY_BYTES: usize = 12 * 1024 * 1024;

/// Authenticated submission route.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/submissions/activity", post(submit_activity))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY_BYTES))
}

/// Public intake route (no session required).
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/submissions/general", post(submit_general))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY_BYTES))
}

#[derive(Serialize)]
pub struct SubmissionResponse {
    pub submission_id: String,
    pub status: String,
}

// ─── Catalog Submission ──────────────────────────────────────

/// Submit proof for a catalog challenge.
async fn submit_activity(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    multipart: Multipart,
) -> Result<Json<SubmissionResponse>> {
    let mut form = parse_form(multipart).await?;

    let activity_id = form
        .take_text("activity_id")
        .ok_or_else(|| AppError::validation("activity_id", "is required"))?;
    let description = form.take_text("description");
    let estimated_kg = form
        .take_text("estimated_kg")
        .map(|raw| {
            raw.parse::<f64>()
                .map_err(|_| AppError::validation("estimated_kg", "must be a number"))
        })
        .transpose()?;
    let photo = form.photo.take();

    let submission = state
        .submissions
        .submit_activity(&user.user_id, &activity_id, photo, description, estimated_kg)
        .await?;

    Ok(Json(SubmissionResponse {
        submission_id: submission.id,
        status: submission.status.to_string(),
    }))
}

// ─── General Submission ──────────────────────────────────────

/// Report a free-form eco-action (public intake form).
async fn submit_general(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<SubmissionResponse>> {
    let mut form = parse_form(multipart).await?;

    let full_name = form.take_text("full_name").unwrap_or_default();
    let phone_number = form.take_text("phone_number").unwrap_or_default();
    let email = form.take_text("email");
    let reason = form.take_text("reason").unwrap_or_default();
    let photo = form.photo.take();

    let submission = state
        .submissions
        .submit_general(&full_name, &phone_number, email, &reason, photo)
        .await?;

    Ok(Json(SubmissionResponse {
        submission_id: submission.id,
        status: submission.status.to_string(),
    }))
}

// ─── Multipart Parsing ───────────────────────────────────────

#[derive(Default)]
struct SubmissionForm {
    text: Vec<(String, String)>,
    photo: Option<PhotoUpload>,
}

impl SubmissionForm {
    fn take_text(&mut self, name: &str) -> Option<String> {
        let idx = self.text.iter().position(|(n, _)| n == name)?;
        let (_, value) = self.text.swap_remove(idx);
        let value = value.trim().to_string();
        (!value.is_empty()).then_some(value)
    }
}

/// Drain the multipart stream into text fields plus the photo part.
async fn parse_form(mut multipart: Multipart) -> Result<SubmissionForm> {
    let mut form = SubmissionForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "photo" {
            let file_name = field.file_name().unwrap_or("photo").to_string();
            let content_type = field.content_type().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read photo: {}", e)))?;

            form.photo = Some(PhotoUpload {
                file_name,
                content_type,
                bytes: bytes.to_vec(),
            });
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read field: {}", e)))?;
            form.text.push((name, value));
        }
    }

    Ok(form)
}
