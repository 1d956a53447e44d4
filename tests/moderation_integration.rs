// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Moderation workflow integration tests (require the Firestore emulator).
//!
//! Cover the review state machine end to end: approval awards points
//! exactly once, rejection never awards, terminal states are immutable,
//! general submissions stay anonymous, and trophy evaluation is
//! idempotent.

use greenpoints::db::FirestoreDb;
use greenpoints::events::EventBus;
use greenpoints::models::{
    ActivityDefinition, ActivitySubmission, GeneralSubmission, Profile, SubmissionStatus, Trophy,
    TrophyTier,
};
use greenpoints::services::{ModerationService, RewardLedger};

mod common;

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4())
}

fn moderation(db: &FirestoreDb) -> ModerationService {
    let ledger = RewardLedger::new(db.clone(), EventBus::default());
    ModerationService::new(db.clone(), ledger)
}

async fn seed_profile(db: &FirestoreDb, user_id: &str) -> Profile {
    let profile = Profile::new(
        user_id.to_string(),
        format!("{}@example.com", user_id),
        user_id.replace('-', "_"),
        None,
        &now(),
    );
    db.upsert_profile(&profile).await.expect("seed profile");
    profile
}

async fn seed_activity(db: &FirestoreDb, activity_id: &str, points: u32) {
    let activity = ActivityDefinition {
        id: activity_id.to_string(),
        title: "Park Cleanup Drive".to_string(),
        description: "Help clean local parks".to_string(),
        points,
        icon: "🌳".to_string(),
        active: true,
        week_start: "2024-03-04T00:00:00Z".to_string(),
        week_end: "2024-03-11T00:00:00Z".to_string(),
        created_at: now(),
    };
    db.upsert_activity(&activity).await.expect("seed activity");
}

async fn seed_submission(
    db: &FirestoreDb,
    user_id: &str,
    activity_id: &str,
    estimated_kg: Option<f64>,
) -> ActivitySubmission {
    let submission = ActivitySubmission {
        id: unique("sub"),
        user_id: user_id.to_string(),
        activity_id: activity_id.to_string(),
        proof_image_url: "https://blobs.example.com/object/sign/activity-proofs/p.jpg".to_string(),
        description: None,
        estimated_kg,
        status: SubmissionStatus::Pending,
        points_awarded: 0,
        submitted_at: now(),
        reviewed_at: None,
    };
    db.insert_activity_submission(&submission)
        .await
        .expect("seed submission");
    submission
}

#[tokio::test]
async fn test_approval_awards_points_exactly_once() {
    require_emulator!();
    let db = common::test_db().await;
    let service = moderation(&db);

    let user_id = unique("user");
    let activity_id = unique("act");
    seed_profile(&db, &user_id).await;
    seed_activity(&db, &activity_id, 15).await;
    let submission = seed_submission(&db, &user_id, &activity_id, None).await;

    // Default award comes from the catalog
    let (approved, profile) = service
        .approve_activity(&submission.id, None)
        .await
        .expect("approval should succeed");

    assert_eq!(approved.status, SubmissionStatus::Approved);
    assert_eq!(approved.points_awarded, 15);
    assert!(approved.reviewed_at.is_some());
    assert_eq!(profile.points, 15);

    // Re-approval must be refused and must not double-award
    let err = service
        .approve_activity(&submission.id, None)
        .await
        .expect_err("re-approval must fail");
    assert!(matches!(
        err,
        greenpoints::error::AppError::InvalidState(_)
    ));

    let profile = db.get_profile(&user_id).await.unwrap().unwrap();
    assert_eq!(profile.points, 15, "Points must not be awarded twice");
}

#[tokio::test]
async fn test_rejection_never_changes_points() {
    require_emulator!();
    let db = common::test_db().await;
    let service = moderation(&db);

    let user_id = unique("user");
    let activity_id = unique("act");
    seed_profile(&db, &user_id).await;
    seed_activity(&db, &activity_id, 15).await;
    let submission = seed_submission(&db, &user_id, &activity_id, None).await;

    let rejected = service
        .reject_activity(&submission.id)
        .await
        .expect("rejection should succeed");

    assert_eq!(rejected.status, SubmissionStatus::Rejected);
    assert_eq!(rejected.points_awarded, 0);
    assert!(rejected.reviewed_at.is_some());

    let profile = db.get_profile(&user_id).await.unwrap().unwrap();
    assert_eq!(profile.points, 0);

    // Terminal: approving a rejected submission must fail
    let err = service
        .approve_activity(&submission.id, None)
        .await
        .expect_err("approve-after-reject must fail");
    assert!(matches!(
        err,
        greenpoints::error::AppError::InvalidState(_)
    ));
}

#[tokio::test]
async fn test_reject_after_approve_blocked() {
    require_emulator!();
    let db = common::test_db().await;
    let service = moderation(&db);

    let user_id = unique("user");
    let activity_id = unique("act");
    seed_profile(&db, &user_id).await;
    seed_activity(&db, &activity_id, 5).await;
    let submission = seed_submission(&db, &user_id, &activity_id, None).await;

    service
        .approve_activity(&submission.id, None)
        .await
        .expect("approval should succeed");

    let err = service
        .reject_activity(&submission.id)
        .await
        .expect_err("reject-after-approve must fail");
    assert!(matches!(
        err,
        greenpoints::error::AppError::InvalidState(_)
    ));

    let stored = db
        .get_activity_submission(&submission.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, SubmissionStatus::Approved);
}

#[tokio::test]
async fn test_points_override_beats_catalog_default() {
    require_emulator!();
    let db = common::test_db().await;
    let service = moderation(&db);

    let user_id = unique("user");
    let activity_id = unique("act");
    seed_profile(&db, &user_id).await;
    seed_activity(&db, &activity_id, 15).await;
    let submission = seed_submission(&db, &user_id, &activity_id, None).await;

    let (approved, profile) = service
        .approve_activity(&submission.id, Some(25))
        .await
        .expect("approval should succeed");

    assert_eq!(approved.points_awarded, 25);
    assert_eq!(profile.points, 25);
}

#[tokio::test]
async fn test_general_submission_flat_award_and_anonymity() {
    require_emulator!();
    let db = common::test_db().await;
    let service = moderation(&db);

    // Profile sharing the submission email: must not be credited
    let user_id = unique("user");
    let profile = seed_profile(&db, &user_id).await;

    let submission = GeneralSubmission {
        id: unique("gen"),
        full_name: "Jane Doe".to_string(),
        phone_number: "555-0100".to_string(),
        email: Some(profile.email.clone()),
        reason: "Cleaned up the beach".to_string(),
        photo_url: "https://blobs.example.com/object/sign/general-submissions/p.jpg".to_string(),
        status: SubmissionStatus::Pending,
        points_awarded: 0,
        submitted_at: now(),
        reviewed_at: None,
    };
    db.insert_general_submission(&submission).await.unwrap();

    let approved = service
        .approve_general(&submission.id)
        .await
        .expect("approval should succeed");

    assert_eq!(approved.status, SubmissionStatus::Approved);
    assert_eq!(approved.points_awarded, 10);

    // Re-approval refused
    let err = service
        .approve_general(&submission.id)
        .await
        .expect_err("re-approval must fail");
    assert!(matches!(
        err,
        greenpoints::error::AppError::InvalidState(_)
    ));

    // Matching email or not, the profile ledger is untouched
    let stored = db.get_profile(&user_id).await.unwrap().unwrap();
    assert_eq!(stored.points, 0);
}

#[tokio::test]
async fn test_trophy_unlock_is_idempotent() {
    require_emulator!();
    let db = common::test_db().await;
    let service = moderation(&db);

    let user_id = unique("user");
    let activity_id = unique("act");
    let trophy_id = unique("trophy");
    seed_profile(&db, &user_id).await;
    seed_activity(&db, &activity_id, 5).await;

    db.upsert_trophy(&Trophy {
        id: trophy_id.clone(),
        name: "Clean Creek".to_string(),
        description: "Remove 5 kg of waste".to_string(),
        tier: TrophyTier::Bronze,
        required_kg: 5.0,
        icon: "🥉".to_string(),
        ar_model_url: None,
        created_at: now(),
    })
    .await
    .unwrap();

    // First approval crosses the threshold
    let first = seed_submission(&db, &user_id, &activity_id, Some(6.0)).await;
    service.approve_activity(&first.id, None).await.unwrap();

    let unlocked = db.get_user_trophies(&user_id).await.unwrap();
    let hits: Vec<_> = unlocked
        .iter()
        .filter(|ut| ut.trophy_id == trophy_id)
        .collect();
    assert_eq!(hits.len(), 1, "Trophy must be unlocked exactly once");
    let first_unlocked_at = hits[0].unlocked_at.clone();

    // Second approval re-evaluates the same threshold
    let second = seed_submission(&db, &user_id, &activity_id, Some(1.0)).await;
    service.approve_activity(&second.id, None).await.unwrap();

    let unlocked = db.get_user_trophies(&user_id).await.unwrap();
    let hits: Vec<_> = unlocked
        .iter()
        .filter(|ut| ut.trophy_id == trophy_id)
        .collect();
    assert_eq!(hits.len(), 1, "Re-evaluation must not duplicate the pair");
    assert_eq!(hits[0].unlocked_at, first_unlocked_at);
}

#[tokio::test]
async fn test_same_day_approvals_keep_streak_at_one() {
    require_emulator!();
    let db = common::test_db().await;
    let service = moderation(&db);

    let user_id = unique("user");
    let activity_id = unique("act");
    seed_profile(&db, &user_id).await;
    seed_activity(&db, &activity_id, 5).await;

    let first = seed_submission(&db, &user_id, &activity_id, None).await;
    let second = seed_submission(&db, &user_id, &activity_id, None).await;

    service.approve_activity(&first.id, None).await.unwrap();
    let (_, profile) = service.approve_activity(&second.id, None).await.unwrap();

    assert_eq!(profile.points, 10);
    assert_eq!(profile.current_streak, 1);
    assert_eq!(profile.longest_streak, 1);
    assert!(profile.last_activity_date.is_some());
}
