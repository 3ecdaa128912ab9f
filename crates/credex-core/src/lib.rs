#![deny(missing_docs)]

//! # credex-core — Foundational Types for the Credex Stack
//!
//! This crate defines the types every other crate in the workspace depends
//! on. It has no internal crate dependencies — only `serde`, `serde_json`,
//! `thiserror`, `chrono`, `uuid`, and `semver` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** A [`Did`] is a distinct,
//!    validated type, not a bare string; fragment stripping for identity
//!    lookups happens in one place ([`Did::base`]).
//!
//! 2. **One version vocabulary.** [`ProtocolVersion`] wraps a strict
//!    semantic version and [`ProtocolGeneration`] is the only way to ask
//!    "which protocol generation is this call" — an ordering comparison,
//!    never string equality.
//!
//! 3. **Version-tagged presentation shapes.** Each protocol generation has
//!    its own strict envelope type ([`Presentation`], [`NoPresentation`],
//!    [`PresentationV2`], [`EncryptedData`]); no any-shaped payload flows
//!    through the pipeline.

pub mod error;
pub mod identity;
pub mod presentation;
pub mod version;

// Re-export primary types at crate root for ergonomic imports.
pub use error::ValidationError;
pub use identity::Did;
pub use presentation::{
    extract_credential_info, Credential, CredentialInfo, EncryptedData, EncryptedKey,
    NoPresentation, Presentation, PresentationV2, Proof, VerdictKind,
};
pub use version::{ProtocolGeneration, ProtocolVersion};
