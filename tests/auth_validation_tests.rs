// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account payload validation tests.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;

mod common;

async fn post_json(
    app: axum::Router,
    uri: &str,
    body: &str,
) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_signup_short_password_rejected() {
    let (app, _) = common::create_test_app();

    let (status, json) = post_json(
        app,
        "/auth/signup",
        r#"{"email":"eco@example.com","password":"short","username":"eco_warrior"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
    assert_eq!(json["field"], "password");
}

#[tokio::test]
async fn test_signup_bad_username_rejected() {
    let (app, _) = common::create_test_app();

    let (status, json) = post_json(
        app,
        "/auth/signup",
        r#"{"email":"eco@example.com","password":"longenough8","username":"bad name!"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["field"], "username");
}

#[tokio::test]
async fn test_signup_invalid_email_rejected() {
    let (app, _) = common::create_test_app();

    let (status, json) = post_json(
        app,
        "/auth/signup",
        r#"{"email":"not-an-email","password":"longenough8","username":"eco_warrior"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["field"], "email");
}

#[tokio::test]
async fn test_signup_valid_payload_passes_validation() {
    let (app, _) = common::create_test_app();

    // Well-formed payload: validation passes and the handler proceeds to
    // the username-uniqueness lookup, which fails on the offline mock.
    // Anything but 400 proves the payload itself was accepted.
    let (status, _) = post_json(
        app,
        "/auth/signup",
        r#"{"email":"eco@example.com","password":"longenough8","username":"eco_warrior","team_name":"Green Team"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_signin_invalid_email_rejected() {
    let (app, _) = common::create_test_app();

    let (status, json) = post_json(
        app,
        "/auth/signin",
        r#"{"email":"not-an-email","password":"whatever1"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["field"], "email");
}

#[tokio::test]
async fn test_reset_password_invalid_email_rejected() {
    let (app, _) = common::create_test_app();

    let (status, json) = post_json(app, "/auth/reset-password", r#"{"email":"nope"}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["field"], "email");
}
