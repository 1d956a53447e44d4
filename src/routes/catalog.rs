// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Public catalog routes: weekly challenges, trophies, geo quests.

use crate::error::Result;
use crate::models::TrophyTier;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/activities", get(list_activities))
        .route("/api/trophies", get(list_trophies))
        .route("/api/geo-quests", get(list_geo_quests))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivityResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub points: u32,
    pub icon: String,
    pub week_start: String,
    pub week_end: String,
}

/// Active weekly challenges.
async fn list_activities(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ActivityResponse>>> {
    let activities = state
        .db
        .list_active_activities()
        .await?
        .into_iter()
        .map(|a| ActivityResponse {
            id: a.id,
            title: a.title,
            description: a.description,
            points: a.points,
            icon: a.icon,
            week_start: a.week_start,
            week_end: a.week_end,
        })
        .collect();

    Ok(Json(activities))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TrophyResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub tier: TrophyTier,
    pub required_kg: f64,
    pub icon: String,
}

/// Full trophy catalog, easiest tier first.
async fn list_trophies(State(state): State<Arc<AppState>>) -> Result<Json<Vec<TrophyResponse>>> {
    let trophies = state
        .db
        .list_trophies()
        .await?
        .into_iter()
        .map(|t| TrophyResponse {
            id: t.id,
            name: t.name,
            description: t.description,
            tier: t.tier,
            required_kg: t.required_kg,
            icon: t.icon,
        })
        .collect();

    Ok(Json(trophies))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct GeoQuestResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub location_name: String,
    pub location_lat: f64,
    pub location_lng: f64,
    pub points_multiplier: f64,
    pub badge_name: String,
    pub icon: String,
    pub ends_at: String,
}

/// Geo quests currently open.
async fn list_geo_quests(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<GeoQuestResponse>>> {
    let now = format_utc_rfc3339(chrono::Utc::now());

    let quests = state
        .db
        .list_active_geo_quests()
        .await?
        .into_iter()
        .filter(|q| q.is_open(&now))
        .map(|q| GeoQuestResponse {
            id: q.id,
            title: q.title,
            description: q.description,
            location_name: q.location_name,
            location_lat: q.location_lat,
            location_lng: q.location_lng,
            points_multiplier: q.points_multiplier,
            badge_name: q.badge_name,
            icon: q.icon,
            ends_at: q.ends_at,
        })
        .collect();

    Ok(Json(quests))
}
