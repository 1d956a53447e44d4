// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::SubmissionStatus;
use crate::AppState;
use axum::{extract::State, routing::get, Extension, Json, Router};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/submissions/mine", get(get_my_submissions))
}

// ─── User Profile ────────────────────────────────────────────

/// Current user response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MeResponse {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub team_name: Option<String>,
    pub avatar_url: Option<String>,
    pub points: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub streak_freeze_tokens: u32,
    /// Display bonus for the current streak tier
    pub streak_multiplier: f64,
    pub total_waste_kg: f64,
    pub trophies: Vec<UnlockedTrophy>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UnlockedTrophy {
    pub trophy_id: String,
    pub unlocked_at: String,
}

/// Get current user profile with streak and trophy state.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<MeResponse>> {
    let profile = state.db.get_profile(&user.user_id).await?.ok_or_else(|| {
        crate::error::AppError::NotFound(format!("Profile {} not found", user.user_id))
    })?;

    let trophies = state
        .db
        .get_user_trophies(&user.user_id)
        .await?
        .into_iter()
        .map(|ut| UnlockedTrophy {
            trophy_id: ut.trophy_id,
            unlocked_at: ut.unlocked_at,
        })
        .collect();

    Ok(Json(MeResponse {
        user_id: profile.user_id.clone(),
        username: profile.username.clone(),
        email: profile.email.clone(),
        team_name: profile.team_name.clone(),
        avatar_url: profile.avatar_url.clone(),
        points: profile.points,
        current_streak: profile.current_streak,
        longest_streak: profile.longest_streak,
        streak_freeze_tokens: profile.streak_freeze_tokens,
        streak_multiplier: profile.streak_multiplier(),
        total_waste_kg: profile.total_waste_kg,
        trophies,
    }))
}

// ─── Own Submissions ─────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MySubmissionsResponse {
    pub submissions: Vec<SubmissionSummary>,
    pub total: u32,
    pub pending: u32,
    pub approved: u32,
    /// Sum of awards across approved submissions
    pub total_points: u32,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SubmissionSummary {
    pub id: String,
    pub activity_id: String,
    pub proof_image_url: String,
    pub description: Option<String>,
    pub status: SubmissionStatus,
    pub points_awarded: u32,
    pub submitted_at: String,
    pub reviewed_at: Option<String>,
}

/// List the caller's submissions with summary counters.
async fn get_my_submissions(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<MySubmissionsResponse>> {
    let submissions = state.db.list_submissions_for_user(&user.user_id).await?;

    let total = submissions.len() as u32;
    let pending = submissions
        .iter()
        .filter(|s| s.status == SubmissionStatus::Pending)
        .count() as u32;
    let approved_rows: Vec<_> = submissions
        .iter()
        .filter(|s| s.status == SubmissionStatus::Approved)
        .collect();
    let approved = approved_rows.len() as u32;
    let total_points = approved_rows.iter().map(|s| s.points_awarded).sum();

    let summaries = submissions
        .iter()
        .map(|s| SubmissionSummary {
            id: s.id.clone(),
            activity_id: s.activity_id.clone(),
            proof_image_url: s.proof_image_url.clone(),
            description: s.description.clone(),
            status: s.status,
            points_awarded: s.points_awarded,
            submitted_at: s.submitted_at.clone(),
            reviewed_at: s.reviewed_at.clone(),
        })
        .collect();

    Ok(Json(MySubmissionsResponse {
        submissions: summaries,
        total,
        pending,
        approved,
        total_points,
    }))
}
