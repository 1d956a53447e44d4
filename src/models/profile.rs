//! User profile and reward-ledger reconciliation.
//!
//! The profile owns the point/streak/waste accumulators. They are mutated
//! exclusively through `apply_approval`, which runs inside the same store
//! transaction as the submission status transition, so a conflicting
//! concurrent approval retries against fresh data.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// User profile stored in the `profiles` collection.
///
/// Keyed by the identity-provider subject id. Created at sign-up; the
/// accumulator fields are only ever written by the reward ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Identity-provider subject id (also used as document ID)
    pub user_id: String,
    /// Email address
    pub email: String,
    /// Unique handle, `[A-Za-z0-9_]{3,30}`
    pub username: String,
    /// Optional team for the team leaderboard
    pub team_name: Option<String>,
    /// Avatar image URL
    pub avatar_url: Option<String>,
    /// Lifetime approved points
    #[serde(default)]
    pub points: u32,
    /// Consecutive days with at least one approved submission
    #[serde(default)]
    pub current_streak: u32,
    /// High-water mark of `current_streak`
    #[serde(default)]
    pub longest_streak: u32,
    /// Streak-freeze tokens held (stored, not consumed by the ledger)
    #[serde(default)]
    pub streak_freeze_tokens: u32,
    /// Calendar date (UTC) of the most recent approved submission
    #[serde(default)]
    pub last_activity_date: Option<NaiveDate>,
    /// Cumulative waste removed across approved submissions (kg)
    #[serde(default)]
    pub total_waste_kg: f64,
    /// When the account was created (RFC3339)
    pub created_at: String,
    /// Last ledger or profile update (RFC3339)
    pub updated_at: String,
}

impl Profile {
    /// Create a fresh profile at sign-up time. All accumulators start at zero.
    pub fn new(
        user_id: String,
        email: String,
        username: String,
        team_name: Option<String>,
        now: &str,
    ) -> Self {
        Self {
            user_id,
            email,
            username,
            team_name,
            avatar_url: None,
            points: 0,
            current_streak: 0,
            longest_streak: 0,
            streak_freeze_tokens: 0,
            last_activity_date: None,
            total_waste_kg: 0.0,
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }

    /// Reconcile one approval into the account.
    ///
    /// Increments points, recomputes the streak relative to `today`, and
    /// accumulates waste. The caller persists the profile in the same
    /// transaction that flips the submission status, so this runs at most
    /// once per submission.
    pub fn apply_approval(
        &mut self,
        points_awarded: u32,
        estimated_kg: Option<f64>,
        today: NaiveDate,
        now: &str,
    ) {
        self.points += points_awarded;

        match self.last_activity_date {
            // Second approval on the same day: streak unchanged
            Some(last) if last == today => {}
            // Consecutive day: extend
            Some(last) if last.succ_opt() == Some(today) => {
                self.current_streak += 1;
            }
            // Gap (or first ever approval): restart at 1
            _ => {
                self.current_streak = 1;
            }
        }
        self.longest_streak = self.longest_streak.max(self.current_streak);
        self.last_activity_date = Some(today);

        if let Some(kg) = estimated_kg {
            self.total_waste_kg += kg;
        }

        self.updated_at = now.to_string();
    }

    /// Streak bonus multiplier shown to the user.
    ///
    /// Display incentive only; approvals award the unscaled catalog value.
    pub fn streak_multiplier(&self) -> f64 {
        streak_multiplier(self.current_streak)
    }
}

/// Multiplier tier for a streak length.
pub fn streak_multiplier(streak: u32) -> f64 {
    if streak >= 100 {
        3.0
    } else if streak >= 30 {
        2.0
    } else if streak >= 7 {
        1.5
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_profile() -> Profile {
        Profile::new(
            "user-1".to_string(),
            "eco@example.com".to_string(),
            "eco_warrior".to_string(),
            None,
            "2024-03-01T12:00:00Z",
        )
    }

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_first_approval_starts_streak() {
        let mut profile = make_profile();

        profile.apply_approval(15, Some(2.5), day("2024-03-02"), "2024-03-02T10:00:00Z");

        assert_eq!(profile.points, 15);
        assert_eq!(profile.current_streak, 1);
        assert_eq!(profile.longest_streak, 1);
        assert_eq!(profile.last_activity_date, Some(day("2024-03-02")));
        assert_eq!(profile.total_waste_kg, 2.5);
    }

    #[test]
    fn test_same_day_approval_keeps_streak() {
        let mut profile = make_profile();

        profile.apply_approval(5, None, day("2024-03-02"), "now");
        profile.apply_approval(10, None, day("2024-03-02"), "now");

        assert_eq!(profile.points, 15);
        assert_eq!(profile.current_streak, 1);
    }

    #[test]
    fn test_consecutive_day_extends_streak() {
        let mut profile = make_profile();

        profile.apply_approval(5, None, day("2024-03-02"), "now");
        profile.apply_approval(5, None, day("2024-03-03"), "now");
        profile.apply_approval(5, None, day("2024-03-04"), "now");

        assert_eq!(profile.current_streak, 3);
        assert_eq!(profile.longest_streak, 3);
    }

    #[test]
    fn test_gap_resets_streak_but_keeps_longest() {
        let mut profile = make_profile();

        profile.apply_approval(5, None, day("2024-03-02"), "now");
        profile.apply_approval(5, None, day("2024-03-03"), "now");
        // Two days missed
        profile.apply_approval(5, None, day("2024-03-06"), "now");

        assert_eq!(profile.current_streak, 1);
        assert_eq!(profile.longest_streak, 2);
    }

    #[test]
    fn test_month_boundary_is_consecutive() {
        let mut profile = make_profile();

        profile.apply_approval(5, None, day("2024-02-29"), "now");
        profile.apply_approval(5, None, day("2024-03-01"), "now");

        assert_eq!(profile.current_streak, 2);
    }

    #[test]
    fn test_waste_accumulates_only_when_estimated() {
        let mut profile = make_profile();

        profile.apply_approval(5, Some(1.0), day("2024-03-02"), "now");
        profile.apply_approval(5, None, day("2024-03-03"), "now");
        profile.apply_approval(5, Some(0.5), day("2024-03-04"), "now");

        assert_eq!(profile.total_waste_kg, 1.5);
    }

    #[test]
    fn test_multiplier_tiers() {
        assert_eq!(streak_multiplier(0), 1.0);
        assert_eq!(streak_multiplier(6), 1.0);
        assert_eq!(streak_multiplier(7), 1.5);
        assert_eq!(streak_multiplier(29), 1.5);
        assert_eq!(streak_multiplier(30), 2.0);
        assert_eq!(streak_multiplier(99), 2.0);
        assert_eq!(streak_multiplier(100), 3.0);
    }
}
