// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Moderation service.
//!
//! Reviewers list pending submissions and decide them. Transitions run as
//! atomic conditional updates in the database layer; a submission that is
//! no longer `pending` cannot be decided again, so points are awarded at
//! most once regardless of racing reviewers.
//!
//! Authorization is the caller's (middleware's) responsibility; this
//! service assumes an admin is already on the line.

use crate::config::GENERAL_SUBMISSION_POINTS;
use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::{ActivitySubmission, GeneralSubmission, Profile};
use crate::services::RewardLedger;
use crate::time_utils::format_utc_rfc3339;
use futures_util::{stream, StreamExt};

const MAX_CONCURRENT_JOINS: usize = 10;

/// A pending catalog submission joined with display context.
#[derive(Debug, Clone)]
pub struct PendingActivityReview {
    pub submission: ActivitySubmission,
    /// Submitter handle, when the profile still resolves
    pub username: Option<String>,
    pub email: Option<String>,
    /// Catalog title and default award
    pub activity_title: Option<String>,
    pub activity_points: Option<u32>,
}

/// Review workflow over both submission queues.
#[derive(Clone)]
pub struct ModerationService {
    db: FirestoreDb,
    ledger: RewardLedger,
}

impl ModerationService {
    pub fn new(db: FirestoreDb, ledger: RewardLedger) -> Self {
        Self { db, ledger }
    }

    /// Pending catalog submissions, newest first, joined with submitter and
    /// activity metadata for the review screen.
    pub async fn list_pending_activity(&self) -> Result<Vec<PendingActivityReview>> {
        let pending = self.db.list_pending_activity_submissions().await?;

        let db = self.db.clone();
        let reviews: Vec<PendingActivityReview> = stream::iter(pending)
            .map(|submission| {
                let db = db.clone();
                async move {
                    let profile = db.get_profile(&submission.user_id).await.ok().flatten();
                    let activity = db.get_activity(&submission.activity_id).await.ok().flatten();

                    PendingActivityReview {
                        username: profile.as_ref().map(|p| p.username.clone()),
                        email: profile.as_ref().map(|p| p.email.clone()),
                        activity_title: activity.as_ref().map(|a| a.title.clone()),
                        activity_points: activity.as_ref().map(|a| a.points),
                        submission,
                    }
                }
            })
            .buffered(MAX_CONCURRENT_JOINS)
            .collect()
            .await;

        Ok(reviews)
    }

    /// Pending general submissions, newest first.
    pub async fn list_pending_general(&self) -> Result<Vec<GeneralSubmission>> {
        self.db.list_pending_general_submissions().await
    }

    /// Approve a catalog submission.
    ///
    /// The award defaults to the activity's catalog point value; a reviewer
    /// may override it. The status transition and the owner's ledger update
    /// commit in one transaction; trophy evaluation and change events run
    /// after the commit (a failure there is logged and repaired by the next
    /// evaluation, never by re-awarding).
    pub async fn approve_activity(
        &self,
        submission_id: &str,
        points_override: Option<u32>,
    ) -> Result<(ActivitySubmission, Profile)> {
        let points_to_award = match points_override {
            Some(points) => points,
            None => self.default_award(submission_id).await?,
        };

        let now_ts = chrono::Utc::now();
        let now = format_utc_rfc3339(now_ts);

        let (submission, profile) = self
            .db
            .approve_activity_submission_atomic(
                submission_id,
                points_to_award,
                crate::time_utils::utc_date(now_ts),
                &now,
            )
            .await?;

        if let Err(e) = self.ledger.finalize_approval(&profile).await {
            tracing::warn!(
                submission_id,
                error = %e,
                "Post-approval ledger finalization failed, continuing"
            );
        }

        Ok((submission, profile))
    }

    /// Reject a catalog submission. No ledger effect.
    pub async fn reject_activity(&self, submission_id: &str) -> Result<ActivitySubmission> {
        let now = format_utc_rfc3339(chrono::Utc::now());
        self.db
            .reject_activity_submission_atomic(submission_id, &now)
            .await
    }

    /// Approve a general submission with the flat award.
    ///
    /// General submissions are anonymous: the award is recorded on the row
    /// and no profile ledger is touched, even when the optional email
    /// matches an account.
    pub async fn approve_general(&self, submission_id: &str) -> Result<GeneralSubmission> {
        let now = format_utc_rfc3339(chrono::Utc::now());
        self.db
            .review_general_submission_atomic(submission_id, true, GENERAL_SUBMISSION_POINTS, &now)
            .await
    }

    /// Reject a general submission.
    pub async fn reject_general(&self, submission_id: &str) -> Result<GeneralSubmission> {
        let now = format_utc_rfc3339(chrono::Utc::now());
        self.db
            .review_general_submission_atomic(submission_id, false, 0, &now)
            .await
    }

    /// Catalog point value for the submission's activity.
    async fn default_award(&self, submission_id: &str) -> Result<u32> {
        let submission = self
            .db
            .get_activity_submission(submission_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Submission {} not found", submission_id))
            })?;

        let activity = self
            .db
            .get_activity(&submission.activity_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Activity {} not found", submission.activity_id))
            })?;

        Ok(activity.points)
    }
}
