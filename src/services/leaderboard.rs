// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Leaderboard projection and community-impact aggregate.
//!
//! Ranking reads go straight to the store; the community aggregate (total
//! waste removed) is cached in memory and recomputed when the ledger
//! publishes a change, so the landing page never fans out over all
//! profiles on every request.

use crate::db::FirestoreDb;
use crate::error::Result;
use crate::events::{EventBus, LedgerEvent};
use crate::models::{LeaderboardEntry, MonthlyLeaderboardSnapshot, Profile};
use crate::time_utils::format_utc_rfc3339;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

/// Community-wide display aggregate.
#[derive(Debug, Clone, Default)]
pub struct CommunityImpact {
    pub total_waste_kg: f64,
    pub member_count: u32,
    pub updated_at: String,
}

/// Read projection over profile point totals.
#[derive(Clone)]
pub struct LeaderboardProjection {
    db: FirestoreDb,
    community: Arc<RwLock<CommunityImpact>>,
}

impl LeaderboardProjection {
    pub fn new(db: FirestoreDb) -> Self {
        Self {
            db,
            community: Arc::new(RwLock::new(CommunityImpact::default())),
        }
    }

    /// Top `n` members by points.
    ///
    /// The store orders by points descending with created_at ascending as
    /// the tie-break; `rank_profiles` re-applies the same ordering so the
    /// result is deterministic even if the store returns ties unordered.
    pub async fn top_n(&self, n: usize) -> Result<Vec<LeaderboardEntry>> {
        let profiles = self.db.top_profiles(n as u32).await?;
        Ok(rank_profiles(profiles, n))
    }

    /// Cached community aggregate.
    pub async fn community_impact(&self) -> CommunityImpact {
        self.community.read().await.clone()
    }

    /// Recompute the community aggregate from all profiles.
    pub async fn refresh_community_impact(&self) -> Result<CommunityImpact> {
        let profiles = self.db.list_profiles().await?;

        let impact = CommunityImpact {
            total_waste_kg: profiles.iter().map(|p| p.total_waste_kg).sum(),
            member_count: profiles.len() as u32,
            updated_at: format_utc_rfc3339(chrono::Utc::now()),
        };

        *self.community.write().await = impact.clone();

        tracing::debug!(
            total_waste_kg = impact.total_waste_kg,
            member_count = impact.member_count,
            "Community impact recomputed"
        );

        Ok(impact)
    }

    /// Spawn the push-driven aggregate refresher.
    ///
    /// Subscribes to the ledger bus and recomputes on every
    /// `AggregateChanged`. The subscription lives exactly as long as the
    /// task: when the bus closes (or the task is aborted) the receiver is
    /// dropped and nothing leaks.
    pub fn spawn_impact_refresher(&self, bus: &EventBus) -> tokio::task::JoinHandle<()> {
        let projection = self.clone();
        let mut rx = bus.subscribe();

        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(LedgerEvent::AggregateChanged) => {
                        if let Err(e) = projection.refresh_community_impact().await {
                            tracing::warn!(error = %e, "Community impact refresh failed");
                        }
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // Recompute-on-notify: one refresh covers the backlog
                        tracing::debug!(skipped, "Impact refresher lagged, catching up");
                        if let Err(e) = projection.refresh_community_impact().await {
                            tracing::warn!(error = %e, "Community impact refresh failed");
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    /// Freeze the current top `n` as the ranking for `(year, month)`.
    pub async fn snapshot_month(
        &self,
        year: i32,
        month: u32,
        n: usize,
    ) -> Result<Vec<MonthlyLeaderboardSnapshot>> {
        let entries = self.top_n(n).await?;
        let now = format_utc_rfc3339(chrono::Utc::now());

        let snapshots: Vec<MonthlyLeaderboardSnapshot> = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| MonthlyLeaderboardSnapshot {
                year,
                month,
                rank: i as u32 + 1,
                user_id: entry.user_id.clone(),
                username: entry.username.clone(),
                points: entry.points,
                snapshot_date: now.clone(),
            })
            .collect();

        self.db.insert_leaderboard_snapshots(&snapshots).await?;

        tracing::info!(year, month, rows = snapshots.len(), "Leaderboard snapshot stored");

        Ok(snapshots)
    }
}

/// Order profiles by points descending, ties broken by earliest account
/// creation, and keep the first `n`. Emails never cross this boundary:
/// the output type has no email field.
pub fn rank_profiles(mut profiles: Vec<Profile>, n: usize) -> Vec<LeaderboardEntry> {
    profiles.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
    profiles.truncate(n);
    profiles.iter().map(LeaderboardEntry::from).collect()
}
