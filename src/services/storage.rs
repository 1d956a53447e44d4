// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Object store client for proof photographs.
//!
//! Uploads go to one of two buckets; retrieval is always through an
//! HMAC-signed, time-limited URL. Both buckets use the same signed policy
//! so access control does not depend on which form a photo arrived through.

use crate::error::AppError;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Bucket for catalog-challenge proofs.
pub const ACTIVITY_PROOFS_BUCKET: &str = "activity-proofs";
/// Bucket for public intake-form proofs.
pub const GENERAL_SUBMISSIONS_BUCKET: &str = "general-submissions";

/// Object store client.
#[derive(Clone)]
pub struct ObjectStoreClient {
    http: reqwest::Client,
    base_url: String,
    signing_key: Vec<u8>,
}

impl ObjectStoreClient {
    pub fn new(base_url: String, signing_key: Vec<u8>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            signing_key,
        }
    }

    /// Upload a blob. The caller inserts its submission row only after this
    /// returns, so a pending row can never reference a missing photo.
    pub async fn upload(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), AppError> {
        let url = format!(
            "{}/object/{}/{}",
            self.base_url,
            bucket,
            urlencoding::encode(key)
        );

        let response = self
            .http
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Storage(format!("HTTP {}: {}", status, body)));
        }

        tracing::debug!(bucket, key, "Blob uploaded");
        Ok(())
    }

    /// Build a signed, time-limited retrieval URL for an object.
    ///
    /// The signature covers bucket, key and expiry, so neither can be
    /// swapped without invalidating the URL.
    pub fn signed_url(
        &self,
        bucket: &str,
        key: &str,
        ttl_seconds: i64,
        issued_at: DateTime<Utc>,
    ) -> String {
        let expires = issued_at.timestamp() + ttl_seconds;
        let signature = sign_object_url(&self.signing_key, bucket, key, expires);

        format!(
            "{}/object/sign/{}/{}?expires={}&signature={}",
            self.base_url,
            bucket,
            urlencoding::encode(key),
            expires,
            signature
        )
    }
}

/// HMAC-SHA256 signature over `{bucket}/{key}|{expires}`, URL-safe base64.
fn sign_object_url(signing_key: &[u8], bucket: &str, key: &str, expires: i64) -> String {
    let payload = format!("{}/{}|{}", bucket, key, expires);

    // Key length is unconstrained for HMAC; new_from_slice cannot fail
    let mut mac =
        HmacSha256::new_from_slice(signing_key).expect("HMAC accepts any key length");
    mac.update(payload.as_bytes());

    URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"test_storage_key";

    #[test]
    fn test_signature_is_deterministic() {
        let a = sign_object_url(KEY, "activity-proofs", "user-1/act-1.jpg", 1_900_000_000);
        let b = sign_object_url(KEY, "activity-proofs", "user-1/act-1.jpg", 1_900_000_000);
        assert_eq!(a, b);
    }

    #[test]
    fn test_signature_binds_bucket_key_and_expiry() {
        let base = sign_object_url(KEY, "activity-proofs", "user-1/act-1.jpg", 1_900_000_000);

        assert_ne!(
            base,
            sign_object_url(KEY, "general-submissions", "user-1/act-1.jpg", 1_900_000_000)
        );
        assert_ne!(
            base,
            sign_object_url(KEY, "activity-proofs", "user-2/act-1.jpg", 1_900_000_000)
        );
        assert_ne!(
            base,
            sign_object_url(KEY, "activity-proofs", "user-1/act-1.jpg", 1_900_000_001)
        );
    }

    #[test]
    fn test_signed_url_shape() {
        let client = ObjectStoreClient::new("https://blobs.example.com".to_string(), KEY.to_vec());
        let issued = chrono::DateTime::from_timestamp(1_700_000_000, 0).unwrap();

        let url = client.signed_url("activity-proofs", "user-1/act-1.jpg", 31_536_000, issued);

        assert!(url.starts_with(
            "https://blobs.example.com/object/sign/activity-proofs/user-1%2Fact-1.jpg?expires=1731536000&signature="
        ));
    }
}
