//! Authority client error types.

/// Errors from verification authority calls.
#[derive(Debug, thiserror::Error)]
pub enum AuthorityError {
    /// HTTP transport error, including elapsed timeouts. Carries no
    /// reissued token — the authority was never reached, so nothing
    /// rotates.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },

    /// The authority returned a non-2xx status. A rejection reply may
    /// still reissue the verifier token, so the rotated token rides along
    /// for the caller to apply before surfacing the error.
    #[error("authority {endpoint} returned {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
        rotated_token: Option<String>,
    },

    /// Response deserialization failed.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] super::config::ConfigError),
}
