//! Authority client configuration.
//!
//! The authority base URL has no sane default — each deployment points at
//! its own authority — so `from_env` requires it. Override the timeout for
//! staging/testing via environment or explicit construction.

use url::Url;

/// Configuration for connecting to the verification authority.
#[derive(Debug, Clone)]
pub struct AuthorityConfig {
    /// Base URL of the verification authority.
    pub base_url: Url,
    /// Request timeout in seconds. Bounds every verification call.
    pub timeout_secs: u64,
}

impl AuthorityConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `AUTHORITY_URL` (required)
    /// - `AUTHORITY_TIMEOUT_SECS` (default: 10)
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = std::env::var("AUTHORITY_URL").map_err(|_| ConfigError::MissingUrl)?;
        let base_url = Url::parse(&raw)
            .map_err(|e| ConfigError::InvalidUrl("AUTHORITY_URL".to_string(), e.to_string()))?;

        Ok(Self {
            base_url,
            timeout_secs: std::env::var("AUTHORITY_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
        })
    }

    /// Create a configuration pointing at a local mock server (for testing).
    pub fn local_mock(base_url: Url) -> Self {
        Self {
            base_url,
            timeout_secs: 5,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("AUTHORITY_URL environment variable is required")]
    MissingUrl,
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
}
