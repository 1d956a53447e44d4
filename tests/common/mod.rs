// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use greenpoints::config::Config;
use greenpoints::db::FirestoreDb;
use greenpoints::events::EventBus;
use greenpoints::routes::create_router;
use greenpoints::services::{
    IdentityClient, LeaderboardProjection, ModerationService, ObjectStoreClient, RewardLedger,
    RoleService, SubmissionService,
};
use greenpoints::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Create a session JWT signed with the test key.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str, signing_key: &[u8]) -> String {
    greenpoints::middleware::auth::create_session_jwt(user_id, signing_key)
        .expect("Failed to create test JWT")
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with_db(test_db_offline())
}

/// Create a test app over a specific database (offline mock or emulator).
#[allow(dead_code)]
pub fn create_test_app_with_db(db: FirestoreDb) -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();

    let identity = IdentityClient::new(
        config.identity_url.clone(),
        config.identity_api_key.clone(),
    );
    let storage = ObjectStoreClient::new(
        config.storage_url.clone(),
        config.storage_signing_key.clone(),
    );

    let events = EventBus::default();
    let submissions = SubmissionService::new(db.clone(), storage);
    let ledger = RewardLedger::new(db.clone(), events.clone());
    let moderation = ModerationService::new(db.clone(), ledger);
    let roles = RoleService::new(db.clone());
    let leaderboard = LeaderboardProjection::new(db.clone());

    let state = Arc::new(AppState {
        config,
        db,
        events,
        identity,
        submissions,
        moderation,
        roles,
        leaderboard,
    });

    (create_router(state.clone()), state)
}
