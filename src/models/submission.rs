// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Proof submissions and their review lifecycle.
//!
//! Both submission variants share the same lifecycle: inserted `pending`
//! with zero points, then moved exactly once to `approved` (points set) or
//! `rejected` (points stay zero). Terminal states are immutable.

use serde::{Deserialize, Serialize};

/// Review state of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Pending,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    /// Terminal states cannot be transitioned again.
    pub fn is_terminal(self) -> bool {
        matches!(self, SubmissionStatus::Approved | SubmissionStatus::Rejected)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Approved => "approved",
            SubmissionStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which moderation queue a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionKind {
    Activity,
    General,
}

/// A member's claim of a completed catalog challenge, awaiting review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivitySubmission {
    /// Submission id (uuid, also used as document ID)
    pub id: String,
    /// Owning profile
    pub user_id: String,
    /// Catalog challenge this claims
    pub activity_id: String,
    /// Signed URL of the proof photo
    pub proof_image_url: String,
    /// Free-text note from the submitter (≤500 chars)
    pub description: Option<String>,
    /// Submitter's estimate of waste removed (kg), when applicable
    pub estimated_kg: Option<f64>,
    pub status: SubmissionStatus,
    /// 0 until approved; set exactly once at the approve transition
    #[serde(default)]
    pub points_awarded: u32,
    pub submitted_at: String,
    pub reviewed_at: Option<String>,
}

/// A free-form eco-action report from the public intake form.
///
/// No account required; identification is by name and phone number only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralSubmission {
    /// Submission id (uuid, also used as document ID)
    pub id: String,
    pub full_name: String,
    pub phone_number: String,
    pub email: Option<String>,
    /// What the submitter did
    pub reason: String,
    /// Signed URL of the proof photo
    pub photo_url: String,
    pub status: SubmissionStatus,
    #[serde(default)]
    pub points_awarded: u32,
    pub submitted_at: String,
    pub reviewed_at: Option<String>,
}
