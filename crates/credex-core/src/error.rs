//! # Error Types
//!
//! Validation errors for the domain primitives, built with `thiserror`.
//! No `Box<dyn Error>`, no `.unwrap()` outside tests.

use thiserror::Error;

/// Domain primitive validation failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The string is not a structurally valid decentralized identifier.
    #[error("invalid DID format: {0}")]
    InvalidDid(String),

    /// The version string is not valid strict semver syntax.
    #[error("version string not in valid semver syntax: {0}")]
    InvalidVersion(String),
}
