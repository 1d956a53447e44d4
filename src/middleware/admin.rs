// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Moderation authorization middleware.
//!
//! Layered after `require_auth` on the `/admin/*` route group. Every
//! moderation read or write passes through `RoleService::is_admin` before
//! the handler runs; non-admins get a 403 and never reach a queue.

use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Require the `admin` role for `/admin/*` routes.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or(AppError::Unauthorized)?;

    if !state.roles.is_admin(&user.user_id).await? {
        tracing::warn!(
            user_id = %user.user_id,
            "Blocked moderation request without admin role"
        );
        return Err(AppError::Permission);
    }

    Ok(next.run(request).await)
}
