// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Submission intake validation tests.
//!
//! All of these run against the offline mock database: a validation
//! failure must be produced before any store or upload call happens, so a
//! 400 here proves nothing was uploaded and no row was inserted.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;

mod common;

const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

/// Build a multipart/form-data body.
/// Each part is (name, file_name, content_type, data).
fn multipart_body(parts: &[(&str, Option<&str>, Option<&str>, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, file_name, content_type, data) in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match file_name {
            Some(fname) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                    name, fname
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n", name).as_bytes(),
            ),
        }
        if let Some(ct) = content_type {
            body.extend_from_slice(format!("Content-Type: {}\r\n", ct).as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn multipart_request(uri: &str, token: Option<&str>, body: Vec<u8>) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri(uri).header(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={}", BOUNDARY),
    );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body)).unwrap()
}

async fn error_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// ─── General Submissions (public intake) ─────────────────────

#[tokio::test]
async fn test_general_submission_missing_phone_names_field() {
    let (app, _) = common::create_test_app();

    let body = multipart_body(&[
        ("full_name", None, None, b"Jane Doe"),
        ("reason", None, None, b"Cleaned up the beach"),
        (
            "photo",
            Some("proof.jpg"),
            Some("image/jpeg"),
            &[0xFFu8; 64],
        ),
    ]);

    let response = app
        .oneshot(multipart_request("/api/submissions/general", None, body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = error_json(response).await;
    assert_eq!(json["error"], "validation_error");
    assert_eq!(json["field"], "phone_number");
}

#[tokio::test]
async fn test_general_submission_oversized_photo_rejected() {
    let (app, _) = common::create_test_app();

    // 6 MB photo: over the 5 MB limit but inside the body ceiling,
    // so the field-naming validation error is produced
    let oversized = vec![0u8; 6 * 1024 * 1024];
    let body = multipart_body(&[
        ("full_name", None, None, b"Jane Doe"),
        ("phone_number", None, None, b"555-0100"),
        ("reason", None, None, b"Cleaned up the beach"),
        ("photo", Some("proof.jpg"), Some("image/jpeg"), &oversized),
    ]);

    let response = app
        .oneshot(multipart_request("/api/submissions/general", None, body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = error_json(response).await;
    assert_eq!(json["field"], "photo");
}

#[tokio::test]
async fn test_general_submission_missing_photo_rejected() {
    let (app, _) = common::create_test_app();

    let body = multipart_body(&[
        ("full_name", None, None, b"Jane Doe"),
        ("phone_number", None, None, b"555-0100"),
        ("reason", None, None, b"Cleaned up the beach"),
    ]);

    let response = app
        .oneshot(multipart_request("/api/submissions/general", None, body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = error_json(response).await;
    assert_eq!(json["field"], "photo");
}

#[tokio::test]
async fn test_general_submission_valid_fails_at_storage_not_validation() {
    let (app, _) = common::create_test_app();

    let body = multipart_body(&[
        ("full_name", None, None, b"Jane Doe"),
        ("phone_number", None, None, b"555-0100"),
        ("reason", None, None, b"Cleaned up the beach"),
        (
            "photo",
            Some("proof.jpg"),
            Some("image/jpeg"),
            &[0xFFu8; 64],
        ),
    ]);

    let response = app
        .oneshot(multipart_request("/api/submissions/general", None, body))
        .await
        .unwrap();

    // Validation passed; the unreachable object store surfaces as 502,
    // not a crash, and no row exists because the upload never succeeded
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let json = error_json(response).await;
    assert_eq!(json["error"], "storage_error");
}

// ─── Catalog Submissions (authenticated) ─────────────────────

#[tokio::test]
async fn test_activity_submission_requires_auth() {
    let (app, _) = common::create_test_app();

    let body = multipart_body(&[("activity_id", None, None, b"act-1")]);

    let response = app
        .oneshot(multipart_request("/api/submissions/activity", None, body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_activity_submission_missing_photo_names_field() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("user-1", &state.config.jwt_signing_key);

    let body = multipart_body(&[("activity_id", None, None, b"act-1")]);

    let response = app
        .oneshot(multipart_request(
            "/api/submissions/activity",
            Some(&token),
            body,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = error_json(response).await;
    assert_eq!(json["field"], "photo");
}

#[tokio::test]
async fn test_activity_submission_non_image_mime_names_photo_field() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("user-1", &state.config.jwt_signing_key);

    let body = multipart_body(&[
        ("activity_id", None, None, b"act-1"),
        (
            "photo",
            Some("proof.pdf"),
            Some("application/pdf"),
            &[0x25u8; 64],
        ),
    ]);

    let response = app
        .oneshot(multipart_request(
            "/api/submissions/activity",
            Some(&token),
            body,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = error_json(response).await;
    assert_eq!(json["error"], "validation_error");
    assert_eq!(json["field"], "photo");
}

#[tokio::test]
async fn test_activity_submission_long_description_rejected() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("user-1", &state.config.jwt_signing_key);

    let long_description = "x".repeat(501);
    let body = multipart_body(&[
        ("activity_id", None, None, b"act-1"),
        ("description", None, None, long_description.as_bytes()),
        (
            "photo",
            Some("proof.jpg"),
            Some("image/jpeg"),
            &[0xFFu8; 64],
        ),
    ]);

    let response = app
        .oneshot(multipart_request(
            "/api/submissions/activity",
            Some(&token),
            body,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = error_json(response).await;
    assert_eq!(json["field"], "description");
}

#[tokio::test]
async fn test_activity_submission_missing_activity_id_rejected() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("user-1", &state.config.jwt_signing_key);

    let body = multipart_body(&[(
        "photo",
        Some("proof.jpg"),
        Some("image/jpeg"),
        &[0xFFu8; 64],
    )]);

    let response = app
        .oneshot(multipart_request(
            "/api/submissions/activity",
            Some(&token),
            body,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = error_json(response).await;
    assert_eq!(json["field"], "activity_id");
}
