//! # credex-authority-client — Typed client for the verification authority
//!
//! Provides ergonomic, typed access to the external verification
//! authority's presentation endpoints:
//!
//! - **`POST /api/verifyPresentation`** — v1 plaintext presentations
//! - **`POST /api/verifyNoPresentation`** — v1 declined-response receipts
//! - **`POST /api/verifyEncryptedPresentation`** — v2+ encrypted envelopes
//!
//! ## Architecture
//!
//! This crate is the only path from the credex stack to the authority.
//! The authority owns all cryptography (decryption, signature checking);
//! this client transports opaque material and interprets the reply.
//!
//! ## Token rollover
//!
//! Every call authenticates with the verifier's current token, normalized
//! to the `Authorization: Bearer` form (stored tokens from pre-rollover
//! registrations may lack the prefix). The authority may reissue the token
//! in the `x-auth-token` response header — on success *and* on rejection —
//! so every reply surface in this crate carries the rotated token.
//!
//! ## No retries
//!
//! One request per invocation. A verification call is not idempotent on
//! the authority's side, so transport failures surface to the caller
//! instead of being retried.

pub mod config;
pub mod error;
pub mod verify;

pub use config::AuthorityConfig;
pub use error::AuthorityError;
pub use verify::{
    AuthorityReply, AuthorityVerdict, VerifyEncryptedPresentationBody, VerifyNoPresentationBody,
    VerifyPresentationBody,
};

use std::time::Duration;

/// HTTP client for the external verification authority.
#[derive(Debug, Clone)]
pub struct AuthorityClient {
    http: reqwest::Client,
    base_url: url::Url,
}

impl AuthorityClient {
    /// Create a new authority client from configuration.
    ///
    /// The configured timeout bounds every outbound call; an elapsed
    /// timeout surfaces as [`AuthorityError::Http`].
    pub fn new(config: AuthorityConfig) -> Result<Self, AuthorityError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AuthorityError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }
}
