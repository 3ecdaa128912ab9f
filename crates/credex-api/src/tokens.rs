//! # Token Custodian
//!
//! Owner of the rotating per-verifier authentication credential. The
//! external authority may reissue the token on any call; whichever caller
//! rotates last overwrites the stored value.
//!
//! ## Concurrency
//!
//! Rotation is unconditional last-write-wins. There is no
//! optimistic-concurrency check tying a rotation to the token value that
//! was read: two concurrent verifications for the same verifier may race
//! on rotation, and the token read by one call is not guaranteed to still
//! be current when the other call rotates. This matches the documented
//! contract; callers must not assume otherwise.

use uuid::Uuid;

use crate::state::VerifierRepository;

/// Keyed custodian for verifier auth tokens.
///
/// A view over the verifier registry: reads return the record's current
/// token, rotations go through the registry's `patch` operation so the
/// record stays the single source of truth.
#[derive(Debug, Clone)]
pub struct TokenCustodian {
    verifiers: VerifierRepository,
}

impl TokenCustodian {
    /// Create a custodian over the given verifier registry.
    pub fn new(verifiers: VerifierRepository) -> Self {
        Self { verifiers }
    }

    /// The verifier's current auth token, or `None` for an unknown verifier.
    pub fn current(&self, verifier_id: &Uuid) -> Option<String> {
        self.verifiers.get(verifier_id).map(|v| v.auth_token)
    }

    /// Overwrite the stored token (last-write-wins). Returns the replaced
    /// token, or `None` for an unknown verifier.
    pub fn rotate(&self, verifier_id: &Uuid, new_token: &str) -> Option<String> {
        let mut previous = None;
        self.verifiers.store.update(verifier_id, |v| {
            previous = Some(std::mem::replace(
                &mut v.auth_token,
                new_token.to_string(),
            ));
            v.updated_at = chrono::Utc::now();
        })?;
        tracing::info!(%verifier_id, "rotated verifier auth token");
        previous
    }
}
