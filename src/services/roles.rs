// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Moderation authorization seam.
//!
//! `is_admin` is the only question callers may ask; how roles are stored
//! stays behind this service. Lookups are cached briefly because every
//! admin request re-checks the role.

use crate::db::FirestoreDb;
use crate::error::AppError;
use dashmap::DashMap;
use std::sync::Arc;

const ADMIN_ROLE: &str = "admin";
const ROLE_CACHE_TTL_SECS: i64 = 300;

#[derive(Clone, Copy)]
struct CachedRole {
    is_admin: bool,
    checked_at: chrono::DateTime<chrono::Utc>,
}

/// Role lookups with a short-lived in-memory cache.
#[derive(Clone)]
pub struct RoleService {
    db: FirestoreDb,
    cache: Arc<DashMap<String, CachedRole>>,
}

impl RoleService {
    pub fn new(db: FirestoreDb) -> Self {
        Self {
            db,
            cache: Arc::new(DashMap::new()),
        }
    }

    /// Whether the user holds the `admin` role.
    pub async fn is_admin(&self, user_id: &str) -> Result<bool, AppError> {
        let now = chrono::Utc::now();

        if let Some(cached) = self.cache.get(user_id) {
            if (now - cached.checked_at).num_seconds() < ROLE_CACHE_TTL_SECS {
                return Ok(cached.is_admin);
            }
        }

        let is_admin = self.db.has_role(user_id, ADMIN_ROLE).await?;

        self.cache.insert(
            user_id.to_string(),
            CachedRole {
                is_admin,
                checked_at: now,
            },
        );

        Ok(is_admin)
    }

    /// Drop a cached entry (e.g. after a role grant/revoke).
    pub fn invalidate(&self, user_id: &str) {
        self.cache.remove(user_id);
    }
}
