// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Public leaderboard and community-impact routes.

use crate::error::Result;
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const DEFAULT_LIMIT: usize = 10;
const MAX_LIMIT: usize = 100;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/leaderboard", get(get_leaderboard))
        .route("/api/community/impact", get(get_community_impact))
}

// ─── Leaderboard ─────────────────────────────────────────────

#[derive(Deserialize)]
struct LeaderboardQuery {
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LeaderboardResponse {
    pub entries: Vec<RankedEntry>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RankedEntry {
    pub rank: u32,
    pub username: String,
    pub team_name: Option<String>,
    pub avatar_url: Option<String>,
    pub points: u32,
}

/// Top members by points. No email ever appears here.
async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardResponse>> {
    let limit = params.limit.clamp(1, MAX_LIMIT);

    let entries = state
        .leaderboard
        .top_n(limit)
        .await?
        .into_iter()
        .enumerate()
        .map(|(i, entry)| RankedEntry {
            rank: i as u32 + 1,
            username: entry.username,
            team_name: entry.team_name,
            avatar_url: entry.avatar_url,
            points: entry.points,
        })
        .collect();

    Ok(Json(LeaderboardResponse { entries }))
}

// ─── Community Impact ────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CommunityImpactResponse {
    pub total_waste_kg: f64,
    pub member_count: u32,
    pub updated_at: String,
}

/// Community-wide total waste removed.
///
/// Served from the push-refreshed cache; falls back to a direct recompute
/// only before the first ledger event of the process lifetime.
async fn get_community_impact(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CommunityImpactResponse>> {
    let mut impact = state.leaderboard.community_impact().await;

    if impact.updated_at.is_empty() {
        impact = state.leaderboard.refresh_community_impact().await?;
    }

    Ok(Json(CommunityImpactResponse {
        total_waste_kg: impact.total_waste_kg,
        member_count: impact.member_count,
        updated_at: impact.updated_at,
    }))
}
