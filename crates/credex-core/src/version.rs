//! # Protocol Version Routing
//!
//! Holder apps declare their wire-protocol generation through a `version`
//! header carrying a strict semantic version. Three incompatible
//! generations are live at once:
//!
//! | Range               | Generation | Envelope |
//! |---------------------|------------|----------|
//! | `< 2.0.0`           | [`ProtocolGeneration::LegacyV1`]    | plaintext presentation bound to a request by id |
//! | `2.0.0 ..< 3.0.0`   | [`ProtocolGeneration::EncryptedV2`] | generic encrypted payload envelope |
//! | `>= 3.0.0`          | [`ProtocolGeneration::DedicatedV3`] | encrypted envelope, dedicated endpoint only |
//!
//! Selection is an ordering comparison on the parsed version, never string
//! equality. Absent headers default to a caller-supplied floor so old
//! holder apps that predate the header keep working.

use semver::Version;

use crate::error::ValidationError;

/// A caller-declared wire-protocol version.
///
/// Wraps a strict [`semver::Version`]; ordering is semantic. Malformed
/// version strings are rejected at the routing boundary, before any
/// external call is made.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ProtocolVersion(Version);

/// The verification path a declared version routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolGeneration {
    /// Pre-2.0.0 plaintext/encrypted-v1 path.
    LegacyV1,
    /// 2.x encrypted-envelope path.
    EncryptedV2,
    /// 3.0.0+ — served only by the dedicated v3 endpoint.
    DedicatedV3,
}

impl ProtocolVersion {
    /// Parse a strict semver string.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidVersion`] for anything
    /// `semver::Version` rejects (missing components, leading `v`, ranges).
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        Version::parse(value.trim())
            .map(Self)
            .map_err(|_| ValidationError::InvalidVersion(value.to_string()))
    }

    /// Resolve an optional `version` header value, falling back to
    /// `default` when the header is absent.
    pub fn from_header(value: Option<&str>, default: Self) -> Result<Self, ValidationError> {
        match value {
            Some(raw) => Self::parse(raw),
            None => Ok(default),
        }
    }

    /// The oldest version the stack still supports: `1.0.0`.
    ///
    /// The legacy endpoint defaults absent headers to this, preserving
    /// backward compatibility with holder apps that predate the header.
    pub fn oldest_supported() -> Self {
        Self(Version::new(1, 0, 0))
    }

    /// The floor of the encrypted-envelope generation: `2.0.0`.
    pub fn v2_floor() -> Self {
        Self(Version::new(2, 0, 0))
    }

    /// The floor of the dedicated-endpoint generation: `3.0.0`.
    pub fn v3_floor() -> Self {
        Self(Version::new(3, 0, 0))
    }

    /// Which verification path this version routes to.
    ///
    /// Every version maps to exactly one generation.
    pub fn generation(&self) -> ProtocolGeneration {
        if self.0 < Version::new(2, 0, 0) {
            ProtocolGeneration::LegacyV1
        } else if self.0 < Version::new(3, 0, 0) {
            ProtocolGeneration::EncryptedV2
        } else {
            ProtocolGeneration::DedicatedV3
        }
    }
}

impl std::fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
