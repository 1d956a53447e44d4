//! Application configuration loaded from environment variables.
//!
//! Secrets (JWT signing key, storage signing key, service API keys) are
//! injected as environment variables by the deployment platform and read
//! once at startup.

use std::env;

/// Flat point award for approved general submissions.
pub const GENERAL_SUBMISSION_POINTS: u32 = 10;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Base URL of the hosted identity gateway
    pub identity_url: String,
    /// Base URL of the hosted object store
    pub storage_url: String,
    /// Frontend URL for CORS and password-reset redirects
    pub frontend_url: String,
    /// GCP project ID (document store)
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,

    // --- Secrets ---
    /// Public API key sent to the identity gateway
    pub identity_api_key: String,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// HMAC key for signed object URLs (raw bytes)
    pub storage_signing_key: Vec<u8>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            identity_url: env::var("IDENTITY_URL")
                .map_err(|_| ConfigError::Missing("IDENTITY_URL"))?,
            storage_url: env::var("STORAGE_URL")
                .map_err(|_| ConfigError::Missing("STORAGE_URL"))?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),

            identity_api_key: env::var("IDENTITY_API_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("IDENTITY_API_KEY"))?,
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            storage_signing_key: env::var("STORAGE_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("STORAGE_SIGNING_KEY"))?
                .into_bytes(),
        })
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            identity_url: "http://localhost:9999".to_string(),
            storage_url: "http://localhost:9998".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            identity_api_key: "test_api_key".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            storage_signing_key: b"test_storage_key".to_vec(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
