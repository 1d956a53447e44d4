// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Catalog models: weekly eco-challenges and geo quests.
//!
//! Both catalogs are curated through separate admin tooling; the
//! submission workflow only ever reads them.

use serde::{Deserialize, Serialize};

/// Admin-curated eco-challenge with a fixed point value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityDefinition {
    /// Catalog entry id (also used as document ID)
    pub id: String,
    /// Challenge title
    pub title: String,
    /// What the participant is asked to do
    pub description: String,
    /// Points awarded on approval
    pub points: u32,
    /// Emoji or icon name for display
    pub icon: String,
    /// Whether the challenge is currently offered
    #[serde(default)]
    pub active: bool,
    /// Challenge window start (RFC3339)
    pub week_start: String,
    /// Challenge window end (RFC3339)
    pub week_end: String,
    /// When the entry was created
    pub created_at: String,
}

/// Location-bound quest with a point multiplier and an exclusive badge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoQuest {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Human-readable place name
    pub location_name: String,
    pub location_lat: f64,
    pub location_lng: f64,
    /// Multiplier applied to quest submissions while the quest runs
    #[serde(default = "default_multiplier")]
    pub points_multiplier: f64,
    /// Badge granted for completing the quest
    pub badge_name: String,
    pub icon: String,
    /// Quest window (RFC3339)
    pub starts_at: String,
    pub ends_at: String,
    #[serde(default)]
    pub active: bool,
    pub created_at: String,
}

fn default_multiplier() -> f64 {
    1.0
}

impl GeoQuest {
    /// Whether the quest is open at `now` (RFC3339 strings compare
    /// lexicographically in UTC).
    pub fn is_open(&self, now: &str) -> bool {
        self.active && self.starts_at.as_str() <= now && now < self.ends_at.as_str()
    }
}
