// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Profiles (account + ledger accumulators)
//! - Catalogs (activities, geo quests, trophies)
//! - Submissions (catalog and general variants)
//! - Roles (moderation authorization)
//! - Leaderboard reads and monthly snapshots
//!
//! The review transitions run inside Firestore transactions: the status is
//! re-read with the document registered for conflict detection, so two
//! moderators racing on the same submission cannot both commit.

use crate::db::collections;
use crate::error::AppError;
use crate::models::{
    ActivityDefinition, ActivitySubmission, GeneralSubmission, GeoQuest,
    MonthlyLeaderboardSnapshot, Profile, SubmissionStatus, Trophy, UserTrophy,
};
use chrono::NaiveDate;
use futures_util::{stream, StreamExt};

const MAX_CONCURRENT_DB_OPS: usize = 50;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Profile Operations ──────────────────────────────────────

    /// Get a profile by user id.
    pub async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::PROFILES)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a profile.
    pub async fn upsert_profile(&self, profile: &Profile) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::PROFILES)
            .document_id(&profile.user_id)
            .object(profile)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Whether a username is already taken.
    pub async fn username_exists(&self, username: &str) -> Result<bool, AppError> {
        let username = username.to_string();
        let matches: Vec<Profile> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::PROFILES)
            .filter(move |q| q.field("username").eq(username.clone()))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(!matches.is_empty())
    }

    /// All profiles (community aggregate recompute).
    pub async fn list_profiles(&self) -> Result<Vec<Profile>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::PROFILES)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Top profiles ordered by points descending, ties broken by earliest
    /// account creation.
    pub async fn top_profiles(&self, limit: u32) -> Result<Vec<Profile>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::PROFILES)
            .order_by([
                ("points", firestore::FirestoreQueryDirection::Descending),
                ("created_at", firestore::FirestoreQueryDirection::Ascending),
            ])
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Catalog Operations ──────────────────────────────────────

    /// Get a catalog activity by id.
    pub async fn get_activity(&self, activity_id: &str) -> Result<Option<ActivityDefinition>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::ACTIVITIES)
            .obj()
            .one(activity_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a catalog activity (admin tooling and tests).
    pub async fn upsert_activity(&self, activity: &ActivityDefinition) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::ACTIVITIES)
            .document_id(&activity.id)
            .object(activity)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Create or update a catalog trophy (admin tooling and tests).
    pub async fn upsert_trophy(&self, trophy: &Trophy) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::TROPHIES)
            .document_id(&trophy.id)
            .object(trophy)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Active catalog activities, newest window first.
    pub async fn list_active_activities(&self) -> Result<Vec<ActivityDefinition>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::ACTIVITIES)
            .filter(|q| q.field("active").eq(true))
            .order_by([("week_start", firestore::FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Active geo quests. Window filtering happens in the service layer.
    pub async fn list_active_geo_quests(&self) -> Result<Vec<GeoQuest>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::GEO_QUESTS)
            .filter(|q| q.field("active").eq(true))
            .order_by([("ends_at", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Full trophy catalog, easiest tier first.
    pub async fn list_trophies(&self) -> Result<Vec<Trophy>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::TROPHIES)
            .order_by([("required_kg", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Trophy Unlock Operations ────────────────────────────────

    /// Trophies a user has unlocked.
    pub async fn get_user_trophies(&self, user_id: &str) -> Result<Vec<UserTrophy>, AppError> {
        let user_id = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::USER_TROPHIES)
            .filter(move |q| q.field("user_id").eq(user_id.clone()))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Record unlocked trophies.
    ///
    /// Document IDs are the deterministic `{user_id}_{trophy_id}` composite,
    /// so re-running an evaluation overwrites instead of duplicating.
    /// Uses concurrent writes with a limit to avoid overloading Firestore.
    pub async fn insert_user_trophies(&self, unlocks: &[UserTrophy]) -> Result<(), AppError> {
        let client = self.get_client()?;

        stream::iter(unlocks.to_vec())
            .map(|unlock| async move {
                let doc_id = UserTrophy::doc_id(&unlock.user_id, &unlock.trophy_id);

                let _: () = client
                    .fluent()
                    .update()
                    .in_col(collections::USER_TROPHIES)
                    .document_id(&doc_id)
                    .object(&unlock)
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;

                Ok::<_, AppError>(())
            })
            .buffer_unordered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<(), AppError>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<()>, AppError>>()?;

        Ok(())
    }

    // ─── Role Operations ─────────────────────────────────────────

    /// Whether `user_id` holds `role` in the `user_roles` collection.
    pub async fn has_role(&self, user_id: &str, role: &str) -> Result<bool, AppError> {
        let user_id = user_id.to_string();
        let role = role.to_string();
        let matches: Vec<serde_json::Value> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USER_ROLES)
            .filter(move |q| {
                q.for_all([
                    q.field("user_id").eq(user_id.clone()),
                    q.field("role").eq(role.clone()),
                ])
            })
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(!matches.is_empty())
    }

    // ─── Submission Operations ───────────────────────────────────

    /// Insert a catalog-activity submission (status must be pending).
    pub async fn insert_activity_submission(
        &self,
        submission: &ActivitySubmission,
    ) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USER_ACTIVITIES)
            .document_id(&submission.id)
            .object(submission)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Insert a general submission (status must be pending).
    pub async fn insert_general_submission(
        &self,
        submission: &GeneralSubmission,
    ) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::GENERAL_SUBMISSIONS)
            .document_id(&submission.id)
            .object(submission)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get a catalog-activity submission by id.
    pub async fn get_activity_submission(
        &self,
        submission_id: &str,
    ) -> Result<Option<ActivitySubmission>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USER_ACTIVITIES)
            .obj()
            .one(submission_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a general submission by id.
    pub async fn get_general_submission(
        &self,
        submission_id: &str,
    ) -> Result<Option<GeneralSubmission>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::GENERAL_SUBMISSIONS)
            .obj()
            .one(submission_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Pending catalog-activity submissions, newest first.
    pub async fn list_pending_activity_submissions(
        &self,
    ) -> Result<Vec<ActivitySubmission>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::USER_ACTIVITIES)
            .filter(|q| q.field("status").eq("pending"))
            .order_by([("submitted_at", firestore::FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Pending general submissions, newest first.
    pub async fn list_pending_general_submissions(
        &self,
    ) -> Result<Vec<GeneralSubmission>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::GENERAL_SUBMISSIONS)
            .filter(|q| q.field("status").eq("pending"))
            .order_by([("submitted_at", firestore::FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All submissions for one user, newest first.
    pub async fn list_submissions_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<ActivitySubmission>, AppError> {
        let user_id = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::USER_ACTIVITIES)
            .filter(move |q| q.field("user_id").eq(user_id.clone()))
            .order_by([("submitted_at", firestore::FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Atomic Review Transitions ───────────────────────────────

    /// Atomically approve a catalog-activity submission and reconcile the
    /// owner's ledger.
    ///
    /// The submission and profile are read inside a Firestore transaction,
    /// which registers both documents for conflict detection: a concurrent
    /// review of the same submission makes the commit fail instead of
    /// double-awarding points. Only `pending` submissions transition;
    /// anything else returns `InvalidState`.
    ///
    /// Returns the approved submission and the updated profile.
    pub async fn approve_activity_submission_atomic(
        &self,
        submission_id: &str,
        points_to_award: u32,
        today: NaiveDate,
        now: &str,
    ) -> Result<(ActivitySubmission, Profile), AppError> {
        let client = self.get_client()?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        // 1. Read the submission within the transaction scope
        let submission: Option<ActivitySubmission> = client
            .fluent()
            .select()
            .by_id_in(collections::USER_ACTIVITIES)
            .obj()
            .one(submission_id)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read submission in transaction: {}", e))
            })?;

        let Some(mut submission) = submission else {
            let _ = transaction.rollback().await;
            return Err(AppError::NotFound(format!(
                "Submission {} not found",
                submission_id
            )));
        };

        // 2. Status guard: terminal submissions are immutable
        if submission.status.is_terminal() {
            let _ = transaction.rollback().await;
            return Err(AppError::InvalidState(format!(
                "submission {} is already {}",
                submission_id, submission.status
            )));
        }

        // 3. Read the owning profile
        let profile: Option<Profile> = client
            .fluent()
            .select()
            .by_id_in(collections::PROFILES)
            .obj()
            .one(&submission.user_id)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read profile in transaction: {}", e))
            })?;

        let Some(mut profile) = profile else {
            // Owner vanished between submission and review
            tracing::warn!(
                submission_id,
                user_id = %submission.user_id,
                "Profile not found, aborting approval"
            );
            let _ = transaction.rollback().await;
            return Err(AppError::NotFound(format!(
                "Profile {} not found",
                submission.user_id
            )));
        };

        // 4. Apply the transition and the ledger update in memory
        submission.status = SubmissionStatus::Approved;
        submission.points_awarded = points_to_award;
        submission.reviewed_at = Some(now.to_string());

        profile.apply_approval(points_to_award, submission.estimated_kg, today, now);

        // 5. Stage both writes
        client
            .fluent()
            .update()
            .in_col(collections::USER_ACTIVITIES)
            .document_id(&submission.id)
            .object(&submission)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add submission to transaction: {}", e))
            })?;

        client
            .fluent()
            .update()
            .in_col(collections::PROFILES)
            .document_id(&profile.user_id)
            .object(&profile)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add profile to transaction: {}", e))
            })?;

        // 6. Commit atomically
        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::info!(
            submission_id,
            user_id = %profile.user_id,
            points_to_award,
            new_total = profile.points,
            "Submission approved"
        );

        Ok((submission, profile))
    }

    /// Atomically reject a catalog-activity submission.
    ///
    /// Same transaction guard as approval; no ledger effect.
    pub async fn reject_activity_submission_atomic(
        &self,
        submission_id: &str,
        now: &str,
    ) -> Result<ActivitySubmission, AppError> {
        let client = self.get_client()?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let submission: Option<ActivitySubmission> = client
            .fluent()
            .select()
            .by_id_in(collections::USER_ACTIVITIES)
            .obj()
            .one(submission_id)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read submission in transaction: {}", e))
            })?;

        let Some(mut submission) = submission else {
            let _ = transaction.rollback().await;
            return Err(AppError::NotFound(format!(
                "Submission {} not found",
                submission_id
            )));
        };

        if submission.status.is_terminal() {
            let _ = transaction.rollback().await;
            return Err(AppError::InvalidState(format!(
                "submission {} is already {}",
                submission_id, submission.status
            )));
        }

        submission.status = SubmissionStatus::Rejected;
        submission.reviewed_at = Some(now.to_string());

        client
            .fluent()
            .update()
            .in_col(collections::USER_ACTIVITIES)
            .document_id(&submission.id)
            .object(&submission)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add submission to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::info!(submission_id, "Submission rejected");

        Ok(submission)
    }

    /// Atomically review a general submission.
    ///
    /// General submissions are anonymous: no profile is read or written
    /// regardless of decision. `points_awarded` is the flat award when
    /// approving, ignored when rejecting.
    pub async fn review_general_submission_atomic(
        &self,
        submission_id: &str,
        approve: bool,
        points_awarded: u32,
        now: &str,
    ) -> Result<GeneralSubmission, AppError> {
        let client = self.get_client()?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let submission: Option<GeneralSubmission> = client
            .fluent()
            .select()
            .by_id_in(collections::GENERAL_SUBMISSIONS)
            .obj()
            .one(submission_id)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read submission in transaction: {}", e))
            })?;

        let Some(mut submission) = submission else {
            let _ = transaction.rollback().await;
            return Err(AppError::NotFound(format!(
                "Submission {} not found",
                submission_id
            )));
        };

        if submission.status.is_terminal() {
            let _ = transaction.rollback().await;
            return Err(AppError::InvalidState(format!(
                "submission {} is already {}",
                submission_id, submission.status
            )));
        }

        if approve {
            submission.status = SubmissionStatus::Approved;
            submission.points_awarded = points_awarded;
        } else {
            submission.status = SubmissionStatus::Rejected;
        }
        submission.reviewed_at = Some(now.to_string());

        client
            .fluent()
            .update()
            .in_col(collections::GENERAL_SUBMISSIONS)
            .document_id(&submission.id)
            .object(&submission)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add submission to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::info!(
            submission_id,
            approved = approve,
            "General submission reviewed"
        );

        Ok(submission)
    }

    // ─── Leaderboard Snapshots ───────────────────────────────────

    /// Store a month-end snapshot of the ranking.
    ///
    /// Document IDs are `{year}-{month:02}_{user_id}`, so re-running the
    /// snapshot for a month overwrites the previous rows.
    pub async fn insert_leaderboard_snapshots(
        &self,
        snapshots: &[MonthlyLeaderboardSnapshot],
    ) -> Result<(), AppError> {
        let client = self.get_client()?;

        stream::iter(snapshots.to_vec())
            .map(|snapshot| async move {
                let doc_id = MonthlyLeaderboardSnapshot::doc_id(
                    snapshot.year,
                    snapshot.month,
                    &snapshot.user_id,
                );

                let _: () = client
                    .fluent()
                    .update()
                    .in_col(collections::LEADERBOARD_SNAPSHOTS)
                    .document_id(&doc_id)
                    .object(&snapshot)
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;

                Ok::<_, AppError>(())
            })
            .buffer_unordered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<(), AppError>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<()>, AppError>>()?;

        Ok(())
    }
}
