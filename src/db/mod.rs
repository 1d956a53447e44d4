//! Database layer (hosted document store).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    pub const PROFILES: &str = "profiles";
    pub const ACTIVITIES: &str = "activities";
    pub const USER_ACTIVITIES: &str = "user_activities";
    pub const GENERAL_SUBMISSIONS: &str = "general_submissions";
    pub const TROPHIES: &str = "trophies";
    pub const USER_TROPHIES: &str = "user_trophies";
    pub const USER_ROLES: &str = "user_roles";
    pub const GEO_QUESTS: &str = "geo_quests";
    /// Frozen month-end top-N rankings
    pub const LEADERBOARD_SNAPSHOTS: &str = "monthly_leaderboard_snapshots";
}
