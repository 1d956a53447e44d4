// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Moderation routes.
//!
//! Mounted behind `require_auth` + `require_admin` (see routes/mod.rs);
//! handlers never see a non-admin caller.

use crate::error::{AppError, Result};
use crate::models::SubmissionKind;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/submissions", get(list_pending))
        .route("/admin/submissions/{id}/approve", post(approve))
        .route("/admin/submissions/{id}/reject", post(reject))
        .route("/admin/leaderboard/snapshot", post(snapshot_leaderboard))
}

// ─── Pending Queues ──────────────────────────────────────────

#[derive(Deserialize)]
struct ListPendingQuery {
    kind: SubmissionKind,
}

#[derive(Serialize)]
pub struct PendingActivityRow {
    pub id: String,
    pub username: Option<String>,
    pub email: Option<String>,
    pub activity_title: Option<String>,
    /// Default award if approved without an override
    pub activity_points: Option<u32>,
    pub description: Option<String>,
    pub estimated_kg: Option<f64>,
    pub proof_image_url: String,
    pub submitted_at: String,
}

#[derive(Serialize)]
pub struct PendingGeneralRow {
    pub id: String,
    pub full_name: String,
    pub phone_number: String,
    pub email: Option<String>,
    pub reason: String,
    pub photo_url: String,
    pub submitted_at: String,
}

/// List pending submissions of the requested kind, newest first.
async fn list_pending(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListPendingQuery>,
) -> Result<Response> {
    match params.kind {
        SubmissionKind::Activity => {
            let rows: Vec<PendingActivityRow> = state
                .moderation
                .list_pending_activity()
                .await?
                .into_iter()
                .map(|review| PendingActivityRow {
                    id: review.submission.id,
                    username: review.username,
                    email: review.email,
                    activity_title: review.activity_title,
                    activity_points: review.activity_points,
                    description: review.submission.description,
                    estimated_kg: review.submission.estimated_kg,
                    proof_image_url: review.submission.proof_image_url,
                    submitted_at: review.submission.submitted_at,
                })
                .collect();
            Ok(Json(rows).into_response())
        }
        SubmissionKind::General => {
            let rows: Vec<PendingGeneralRow> = state
                .moderation
                .list_pending_general()
                .await?
                .into_iter()
                .map(|s| PendingGeneralRow {
                    id: s.id,
                    full_name: s.full_name,
                    phone_number: s.phone_number,
                    email: s.email,
                    reason: s.reason,
                    photo_url: s.photo_url,
                    submitted_at: s.submitted_at,
                })
                .collect();
            Ok(Json(rows).into_response())
        }
    }
}

// ─── Review Decisions ────────────────────────────────────────

#[derive(Deserialize)]
struct ApproveRequest {
    kind: SubmissionKind,
    /// Override for the default award (catalog value / flat general award)
    points: Option<u32>,
}

#[derive(Serialize)]
pub struct ReviewResponse {
    pub submission_id: String,
    pub status: String,
    pub points_awarded: u32,
    /// Owner's balance after the award (catalog submissions only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_points: Option<u32>,
}

/// Approve a pending submission and award points.
async fn approve(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ApproveRequest>,
) -> Result<Json<ReviewResponse>> {
    match req.kind {
        SubmissionKind::Activity => {
            let (submission, profile) =
                state.moderation.approve_activity(&id, req.points).await?;
            Ok(Json(ReviewResponse {
                submission_id: submission.id,
                status: submission.status.to_string(),
                points_awarded: submission.points_awarded,
                user_points: Some(profile.points),
            }))
        }
        SubmissionKind::General => {
            if req.points.is_some() {
                return Err(AppError::BadRequest(
                    "General submissions carry a fixed award".to_string(),
                ));
            }
            let submission = state.moderation.approve_general(&id).await?;
            Ok(Json(ReviewResponse {
                submission_id: submission.id,
                status: submission.status.to_string(),
                points_awarded: submission.points_awarded,
                user_points: None,
            }))
        }
    }
}

#[derive(Deserialize)]
struct RejectRequest {
    kind: SubmissionKind,
}

/// Reject a pending submission. Points stay at zero.
async fn reject(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<RejectRequest>,
) -> Result<Json<ReviewResponse>> {
    let response = match req.kind {
        SubmissionKind::Activity => {
            let submission = state.moderation.reject_activity(&id).await?;
            ReviewResponse {
                submission_id: submission.id,
                status: submission.status.to_string(),
                points_awarded: submission.points_awarded,
                user_points: None,
            }
        }
        SubmissionKind::General => {
            let submission = state.moderation.reject_general(&id).await?;
            ReviewResponse {
                submission_id: submission.id,
                status: submission.status.to_string(),
                points_awarded: submission.points_awarded,
                user_points: None,
            }
        }
    };

    Ok(Json(response))
}

// ─── Monthly Snapshot ────────────────────────────────────────

#[derive(Deserialize)]
struct SnapshotRequest {
    year: i32,
    month: u32,
    #[serde(default = "default_snapshot_limit")]
    limit: usize,
}

fn default_snapshot_limit() -> usize {
    10
}

#[derive(Serialize)]
pub struct SnapshotResponse {
    pub year: i32,
    pub month: u32,
    pub rows: usize,
}

/// Freeze the current top-N ranking for a calendar month.
async fn snapshot_leaderboard(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SnapshotRequest>,
) -> Result<Json<SnapshotResponse>> {
    if !(1..=12).contains(&req.month) {
        return Err(AppError::BadRequest("Month must be 1-12".to_string()));
    }

    let snapshots = state
        .leaderboard
        .snapshot_month(req.year, req.month, req.limit)
        .await?;

    Ok(Json(SnapshotResponse {
        year: req.year,
        month: req.month,
        rows: snapshots.len(),
    }))
}
