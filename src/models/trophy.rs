// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trophy catalog and unlock evaluation.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Trophy tier, ordered by required cumulative waste.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrophyTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

/// Catalog trophy unlocked by cumulative waste removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trophy {
    /// Catalog entry id (also used as document ID)
    pub id: String,
    pub name: String,
    pub description: String,
    pub tier: TrophyTier,
    /// Cumulative kg of waste required to unlock
    pub required_kg: f64,
    pub icon: String,
    /// Optional AR model for the trophy cabinet view
    pub ar_model_url: Option<String>,
    pub created_at: String,
}

/// A trophy a user has unlocked. Created once, never updated.
///
/// Document ID is `{user_id}_{trophy_id}`, so re-evaluating thresholds
/// overwrites the same document instead of duplicating the pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserTrophy {
    pub user_id: String,
    pub trophy_id: String,
    pub unlocked_at: String,
}

impl UserTrophy {
    /// Deterministic document ID for the (user, trophy) pair.
    pub fn doc_id(user_id: &str, trophy_id: &str) -> String {
        format!("{}_{}", user_id, trophy_id)
    }
}

/// Trophies whose threshold `total_waste_kg` now meets and which the user
/// has not unlocked yet. Idempotent: already-unlocked ids never reappear.
pub fn newly_unlocked<'a>(
    catalog: &'a [Trophy],
    unlocked_ids: &HashSet<String>,
    total_waste_kg: f64,
) -> Vec<&'a Trophy> {
    catalog
        .iter()
        .filter(|t| total_waste_kg >= t.required_kg && !unlocked_ids.contains(&t.id))
        .collect()
}
