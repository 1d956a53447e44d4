// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Reward ledger.
//!
//! The ledger owns every durable consequence of an approval:
//! - the in-transaction reconciliation (points, streak, waste) lives on
//!   `Profile::apply_approval` and is invoked by the database layer inside
//!   the same transaction that flips the submission status;
//! - the post-commit steps here evaluate trophy thresholds and notify
//!   subscribers.
//!
//! Trophy evaluation is idempotent: the `{user_id}_{trophy_id}` document id
//! means re-running it can only overwrite, never duplicate, and a missed
//! run is repaired by the next approval.

use crate::db::FirestoreDb;
use crate::error::Result;
use crate::events::{EventBus, LedgerEvent};
use crate::models::{Profile, UserTrophy};
use crate::time_utils::format_utc_rfc3339;
use std::collections::HashSet;

/// Post-commit side of the reward ledger.
#[derive(Clone)]
pub struct RewardLedger {
    db: FirestoreDb,
    events: EventBus,
}

impl RewardLedger {
    pub fn new(db: FirestoreDb, events: EventBus) -> Self {
        Self { db, events }
    }

    /// Run trophy evaluation and publish change events for an approval that
    /// already committed.
    ///
    /// Returns the ids of trophies unlocked by this evaluation.
    pub async fn finalize_approval(&self, profile: &Profile) -> Result<Vec<String>> {
        let unlocked = self.evaluate_trophies(profile).await?;

        self.events.publish(LedgerEvent::PointsChanged {
            user_id: profile.user_id.clone(),
            points: profile.points,
        });
        self.events.publish(LedgerEvent::AggregateChanged);

        Ok(unlocked)
    }

    /// Compare `total_waste_kg` against the trophy catalog and record every
    /// newly met threshold.
    async fn evaluate_trophies(&self, profile: &Profile) -> Result<Vec<String>> {
        let catalog = self.db.list_trophies().await?;
        if catalog.is_empty() {
            return Ok(vec![]);
        }

        let unlocked_ids: HashSet<String> = self
            .db
            .get_user_trophies(&profile.user_id)
            .await?
            .into_iter()
            .map(|ut| ut.trophy_id)
            .collect();

        let hits = crate::models::trophy::newly_unlocked(
            &catalog,
            &unlocked_ids,
            profile.total_waste_kg,
        );
        if hits.is_empty() {
            return Ok(vec![]);
        }

        let now = format_utc_rfc3339(chrono::Utc::now());
        let unlocks: Vec<UserTrophy> = hits
            .iter()
            .map(|t| UserTrophy {
                user_id: profile.user_id.clone(),
                trophy_id: t.id.clone(),
                unlocked_at: now.clone(),
            })
            .collect();

        self.db.insert_user_trophies(&unlocks).await?;

        for trophy in &hits {
            tracing::info!(
                user_id = %profile.user_id,
                trophy = %trophy.name,
                required_kg = trophy.required_kg,
                total_kg = profile.total_waste_kg,
                "Trophy unlocked"
            );
        }

        Ok(hits.into_iter().map(|t| t.id.clone()).collect())
    }
}
