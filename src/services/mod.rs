// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod identity;
pub mod leaderboard;
pub mod ledger;
pub mod moderation;
pub mod roles;
pub mod storage;
pub mod submission;

pub use identity::{IdentityClient, IdentityUser, SignInResult};
pub use leaderboard::{CommunityImpact, LeaderboardProjection};
pub use ledger::RewardLedger;
pub use moderation::{ModerationService, PendingActivityReview};
pub use roles::RoleService;
pub use storage::ObjectStoreClient;
pub use submission::{PhotoUpload, SubmissionService};
