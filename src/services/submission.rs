// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Submission intake service.
//!
//! Handles the core workflow for both submission variants:
//! 1. Validate the payload (first violated field is named in the error)
//! 2. Upload the proof photo to the object store
//! 3. Build a signed retrieval URL
//! 4. Insert the pending row
//!
//! Nothing is uploaded or inserted when validation fails. An upload that
//! succeeds before a failed insert leaves an orphaned blob; the key layout
//! keeps those reconcilable offline and no inline compensation is
//! attempted.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::{ActivitySubmission, GeneralSubmission, SubmissionStatus};
use crate::services::storage::{
    ObjectStoreClient, ACTIVITY_PROOFS_BUCKET, GENERAL_SUBMISSIONS_BUCKET,
};
use crate::time_utils::format_utc_rfc3339;

/// Maximum accepted proof photo size.
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;
/// Maximum description length for catalog submissions.
pub const MAX_DESCRIPTION_CHARS: usize = 500;
/// Signed URL lifetime for proof photos (~1 year).
pub const SIGNED_URL_TTL_SECS: i64 = 31_536_000;

const ALLOWED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// Proof photo as received from the multipart form.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl PhotoUpload {
    /// File extension for the storage key, derived from the MIME type.
    fn extension(&self) -> &'static str {
        match self.content_type.as_str() {
            "image/png" => "png",
            "image/webp" => "webp",
            _ => "jpg",
        }
    }
}

/// Submission intake workflow.
#[derive(Clone)]
pub struct SubmissionService {
    db: FirestoreDb,
    storage: ObjectStoreClient,
}

impl SubmissionService {
    pub fn new(db: FirestoreDb, storage: ObjectStoreClient) -> Self {
        Self { db, storage }
    }

    /// Record a catalog-challenge claim.
    ///
    /// Returns the created submission, status `pending`, zero points.
    pub async fn submit_activity(
        &self,
        user_id: &str,
        activity_id: &str,
        photo: Option<PhotoUpload>,
        description: Option<String>,
        estimated_kg: Option<f64>,
    ) -> Result<ActivitySubmission> {
        let photo = validate_photo(photo)?;
        let description = validate_description(description)?;

        if let Some(kg) = estimated_kg {
            if !kg.is_finite() || kg < 0.0 {
                return Err(AppError::validation(
                    "estimated_kg",
                    "must be a non-negative number",
                ));
            }
        }

        let activity = self
            .db
            .get_activity(activity_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Activity {} not found", activity_id)))?;

        if !activity.active {
            return Err(AppError::BadRequest(format!(
                "Activity '{}' is not currently open for submissions",
                activity.title
            )));
        }

        let now = chrono::Utc::now();
        let key = format!(
            "{}/{}-{}.{}",
            user_id,
            activity_id,
            now.timestamp_millis(),
            photo.extension()
        );

        // Upload must complete before any row exists
        self.storage
            .upload(ACTIVITY_PROOFS_BUCKET, &key, &photo.content_type, photo.bytes)
            .await?;

        let proof_image_url =
            self.storage
                .signed_url(ACTIVITY_PROOFS_BUCKET, &key, SIGNED_URL_TTL_SECS, now);

        let submission = ActivitySubmission {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            activity_id: activity_id.to_string(),
            proof_image_url,
            description,
            estimated_kg,
            status: SubmissionStatus::Pending,
            points_awarded: 0,
            submitted_at: format_utc_rfc3339(now),
            reviewed_at: None,
        };

        if let Err(e) = self.db.insert_activity_submission(&submission).await {
            // The blob stays behind; the key prefix keeps it attributable
            tracing::warn!(
                bucket = ACTIVITY_PROOFS_BUCKET,
                key = %key,
                "Submission insert failed after upload, blob orphaned"
            );
            return Err(e);
        }

        tracing::info!(
            submission_id = %submission.id,
            user_id,
            activity_id,
            "Activity submission recorded"
        );

        Ok(submission)
    }

    /// Record a free-form eco-action report from the public intake form.
    pub async fn submit_general(
        &self,
        full_name: &str,
        phone_number: &str,
        email: Option<String>,
        reason: &str,
        photo: Option<PhotoUpload>,
    ) -> Result<GeneralSubmission> {
        if full_name.trim().is_empty() {
            return Err(AppError::validation("full_name", "is required"));
        }
        if phone_number.trim().is_empty() {
            return Err(AppError::validation("phone_number", "is required"));
        }
        if reason.trim().is_empty() {
            return Err(AppError::validation("reason", "is required"));
        }
        let photo = validate_photo(photo)?;

        let email = email.filter(|e| !e.trim().is_empty());

        let now = chrono::Utc::now();
        let id = uuid::Uuid::new_v4().to_string();
        let key = format!("{}_{}.{}", now.timestamp_millis(), id, photo.extension());

        self.storage
            .upload(
                GENERAL_SUBMISSIONS_BUCKET,
                &key,
                &photo.content_type,
                photo.bytes,
            )
            .await?;

        // Signed like the activity bucket; general proofs are not public
        let photo_url =
            self.storage
                .signed_url(GENERAL_SUBMISSIONS_BUCKET, &key, SIGNED_URL_TTL_SECS, now);

        let submission = GeneralSubmission {
            id,
            full_name: full_name.trim().to_string(),
            phone_number: phone_number.trim().to_string(),
            email,
            reason: reason.trim().to_string(),
            photo_url,
            status: SubmissionStatus::Pending,
            points_awarded: 0,
            submitted_at: format_utc_rfc3339(now),
            reviewed_at: None,
        };

        if let Err(e) = self.db.insert_general_submission(&submission).await {
            tracing::warn!(
                bucket = GENERAL_SUBMISSIONS_BUCKET,
                key = %key,
                "Submission insert failed after upload, blob orphaned"
            );
            return Err(e);
        }

        tracing::info!(submission_id = %submission.id, "General submission recorded");

        Ok(submission)
    }
}

/// Photo constraints: present, within the size limit, image MIME type.
fn validate_photo(photo: Option<PhotoUpload>) -> Result<PhotoUpload> {
    let photo = photo.ok_or_else(|| AppError::validation("photo", "a proof photo is required"))?;

    if photo.bytes.is_empty() {
        return Err(AppError::validation("photo", "a proof photo is required"));
    }
    if photo.bytes.len() > MAX_PHOTO_BYTES {
        return Err(AppError::validation("photo", "image must be under 5MB"));
    }
    if !ALLOWED_IMAGE_TYPES.contains(&photo.content_type.as_str()) {
        return Err(AppError::validation(
            "photo",
            format!("unsupported image type '{}'", photo.content_type),
        ));
    }

    Ok(photo)
}

/// Description is optional but capped.
fn validate_description(description: Option<String>) -> Result<Option<String>> {
    let description = description.filter(|d| !d.trim().is_empty());

    if let Some(ref d) = description {
        if d.chars().count() > MAX_DESCRIPTION_CHARS {
            return Err(AppError::validation(
                "description",
                "must be under 500 characters",
            ));
        }
    }

    Ok(description)
}
