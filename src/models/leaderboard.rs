// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Leaderboard projection types.
//!
//! `LeaderboardEntry` is the only shape profile data leaves the service in
//! for ranking views. It deliberately has no email field; building it from
//! a `Profile` is the confidentiality boundary, not a convenience.

use crate::models::Profile;
use serde::{Deserialize, Serialize};

/// One ranked row of the public leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub username: String,
    pub team_name: Option<String>,
    pub avatar_url: Option<String>,
    pub points: u32,
    /// Account creation time; earlier accounts win ties
    pub created_at: String,
}

impl From<&Profile> for LeaderboardEntry {
    fn from(profile: &Profile) -> Self {
        Self {
            user_id: profile.user_id.clone(),
            username: profile.username.clone(),
            team_name: profile.team_name.clone(),
            avatar_url: profile.avatar_url.clone(),
            points: profile.points,
            created_at: profile.created_at.clone(),
        }
    }
}

/// Frozen month-end ranking row.
///
/// Document ID is `{year}-{month:02}_{user_id}`, so re-running a snapshot
/// for the same month overwrites rather than duplicates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyLeaderboardSnapshot {
    pub year: i32,
    pub month: u32,
    /// 1-based rank within the month
    pub rank: u32,
    pub user_id: String,
    pub username: String,
    pub points: u32,
    pub snapshot_date: String,
}

impl MonthlyLeaderboardSnapshot {
    /// Deterministic document ID for the (month, user) pair.
    pub fn doc_id(year: i32, month: u32, user_id: &str) -> String {
        format!("{}-{:02}_{}", year, month, user_id)
    }
}
