// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GreenPoints API Server
//!
//! Serves the gamified sustainability workflow: proof submissions,
//! moderation, the reward ledger, and the community leaderboard.

use greenpoints::{
    config::Config,
    db::FirestoreDb,
    events::EventBus,
    services::{
        IdentityClient, LeaderboardProjection, ModerationService, ObjectStoreClient, RewardLedger,
        RoleService, SubmissionService,
    },
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting GreenPoints API");

    // Initialize document store
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    // Hosted collaborators
    let identity = IdentityClient::new(config.identity_url.clone(), config.identity_api_key.clone());
    let storage = ObjectStoreClient::new(
        config.storage_url.clone(),
        config.storage_signing_key.clone(),
    );
    tracing::info!(
        identity = %config.identity_url,
        storage = %config.storage_url,
        "Collaborator clients initialized"
    );

    // Ledger event bus shared between the ledger and projections
    let events = EventBus::default();

    // Core services
    let submissions = SubmissionService::new(db.clone(), storage);
    let ledger = RewardLedger::new(db.clone(), events.clone());
    let moderation = ModerationService::new(db.clone(), ledger);
    let roles = RoleService::new(db.clone());
    let leaderboard = LeaderboardProjection::new(db.clone());

    // Warm the community aggregate, then keep it fresh on ledger events
    if let Err(e) = leaderboard.refresh_community_impact().await {
        tracing::warn!(error = %e, "Initial community impact recompute failed");
    }
    let _impact_refresher = leaderboard.spawn_impact_refresher(&events);
    tracing::info!("Community impact refresher started");

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        events,
        identity,
        submissions,
        moderation,
        roles,
        leaderboard,
    });

    // Build router
    let app = greenpoints::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("greenpoints=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
