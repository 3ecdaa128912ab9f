//! # Disclosure Recorder
//!
//! Persists one SharedCredential per disclosed credential after a
//! verified, credential-bearing verdict. The whole step is all-or-nothing
//! per presentation: every credential's issuer and subject must resolve
//! to local records (by fragment-stripped DID) before anything is
//! written, so a partially-matched presentation leaves zero rows.

use uuid::Uuid;

use credex_core::{Credential, Did};

use crate::error::AppError;
use crate::state::AppState;

/// Resolve and persist every disclosed credential. Returns the number of
/// rows written — used for observability only.
pub(crate) fn record_disclosures(
    state: &AppState,
    verifier_id: Uuid,
    credentials: &[Credential],
) -> Result<usize, AppError> {
    // Resolve everything before persisting anything.
    let mut resolved = Vec::with_capacity(credentials.len());
    for credential in credentials {
        let issuer_did = Did::new(credential.issuer.as_str())
            .map_err(|e| AppError::Resolution(format!("credential {}: {e}", credential.id)))?;
        let issuer = state.issuers.get_by_did(issuer_did.base()).ok_or_else(|| {
            AppError::Resolution(format!("no issuer registered for {}", issuer_did.base()))
        })?;

        let subject = credential.subject_did().ok_or_else(|| {
            AppError::Resolution(format!("credential {} carries no subject DID", credential.id))
        })?;
        let subject_did = Did::new(subject)
            .map_err(|e| AppError::Resolution(format!("credential {}: {e}", credential.id)))?;
        let user = state.users.get_by_did(subject_did.base()).ok_or_else(|| {
            AppError::Resolution(format!("no user registered for {}", subject_did.base()))
        })?;

        resolved.push((user.id, issuer.id, credential.clone()));
    }

    let count = resolved.len();
    for (user_id, issuer_id, credential) in resolved {
        state
            .shared_credentials
            .create(user_id, issuer_id, verifier_id, credential);
    }
    Ok(count)
}
