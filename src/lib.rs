// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! GreenPoints: gamified community sustainability backend
//!
//! This crate provides the backend API for the submission → moderation →
//! reward workflow: members submit photographic proof of eco-actions,
//! reviewers approve or reject them, and approvals reconcile points,
//! streaks, and trophies into member profiles.

pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use events::EventBus;
use services::{
    IdentityClient, LeaderboardProjection, ModerationService, RoleService, SubmissionService,
};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub events: EventBus,
    pub identity: IdentityClient,
    pub submissions: SubmissionService,
    pub moderation: ModerationService,
    pub roles: RoleService,
    pub leaderboard: LeaderboardProjection,
}
