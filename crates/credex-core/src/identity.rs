//! # Decentralized Identifiers
//!
//! The [`Did`] newtype identifies issuers, verifiers, and credential
//! subjects throughout the stack. A DID may carry a `#fragment` suffix
//! naming a specific key; registry records store the bare DID, so identity
//! lookups always go through [`Did::base`].
//!
//! Reference: <https://www.w3.org/TR/did-core/#did-syntax>

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// W3C Decentralized Identifier (DID).
///
/// Format: `did:<method>:<method-specific-id>`, optionally suffixed with a
/// `#fragment` key identifier.
///
/// # Validation
///
/// - Must start with `did:`
/// - Method name must be at least 1 character, lowercase alphanumeric
/// - Must have a `:` separator after the method
/// - Method-specific identifier must be non-empty
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Did(String);

impl Did {
    /// Create a DID from a string, validating format.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidDid`] if the string does not
    /// match the `did:method:identifier` format.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        Self::validate(&s)?;
        Ok(Self(s))
    }

    /// Validate DID format without constructing.
    fn validate(s: &str) -> Result<(), ValidationError> {
        if !s.starts_with("did:") {
            return Err(ValidationError::InvalidDid(s.to_string()));
        }

        let rest = &s[4..]; // after "did:"
        match rest.find(':') {
            None => return Err(ValidationError::InvalidDid(s.to_string())),
            Some(pos) => {
                let method = &rest[..pos];
                let identifier = &rest[pos + 1..];

                // Method must be non-empty and lowercase alphanumeric
                if method.is_empty()
                    || !method
                        .chars()
                        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
                {
                    return Err(ValidationError::InvalidDid(s.to_string()));
                }

                // Identifier must be non-empty
                if identifier.is_empty() {
                    return Err(ValidationError::InvalidDid(s.to_string()));
                }
            }
        }

        Ok(())
    }

    /// Access the full DID string value, fragment included.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The bare DID with any `#fragment` key identifier stripped.
    ///
    /// Registry records never store fragments, so this is the form used
    /// for all identity lookups.
    pub fn base(&self) -> &str {
        match self.0.find('#') {
            Some(pos) => &self.0[..pos],
            None => &self.0,
        }
    }

    /// The `#fragment` key identifier, if present (without the `#`).
    pub fn fragment(&self) -> Option<&str> {
        self.0.find('#').map(|pos| &self.0[pos + 1..])
    }
}

impl std::fmt::Display for Did {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
