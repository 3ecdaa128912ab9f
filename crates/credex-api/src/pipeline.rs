//! # Verification Forwarder
//!
//! The core pipeline behind every presentation endpoint. Each inbound
//! call runs the same acts, strictly in order:
//!
//! 1. **Load context** — the presentation request and its verifier, by id.
//! 2. **Read the token** — the verifier's current auth token from the
//!    custodian.
//! 3. **Forward** — exactly one call to the external verification
//!    authority, carrying the envelope, the verifier DID, the encryption
//!    key (encrypted paths only), and the normalized Bearer token.
//! 4. **Rotate** — if the reply carries a reissued token that differs
//!    from the one sent, rotate it through the custodian. This happens
//!    before any return, on positive and negative verdicts alike.
//! 5. **Settle the verdict** — rejections surface as 400-class errors with
//!    nothing persisted; verified credential-bearing verdicts go through
//!    disclosure recording.
//! 6. **Notify** — the verdict is published to the correlated user's
//!    channel on a detached task, after which the receipt returns to the
//!    synchronous caller.
//!
//! There is no retry anywhere between these acts; a failed call surfaces
//! as its error class and the inbound envelope is processed at most once.
//! Replaying the same envelope performs a second authority call and, if
//! accepted again, records duplicate disclosures — replay protection is
//! the authority's concern, not this pipeline's.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use credex_authority_client::{
    AuthorityError, AuthorityReply, AuthorityVerdict, VerifyEncryptedPresentationBody,
    VerifyNoPresentationBody, VerifyPresentationBody,
};
use credex_core::{extract_credential_info, Credential, ProtocolVersion, VerdictKind};

use crate::disclosure;
use crate::envelope::{EncryptedEnvelope, InboundPresentation, PresentationEnvelopeV1};
use crate::error::AppError;
use crate::notify::{self, VerdictEvent};
use crate::state::{AppState, IssuerInfo, PresentationRequestRecord, VerifierRecord};

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Receipt of a completed verification, returned to the synchronous
/// caller. Carries only summary data — the plaintext presentation goes to
/// the correlated user's channel, never back through this response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PresentationReceipt {
    /// Subject DID of the disclosed credentials, if any were disclosed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_did: Option<String>,
    /// Domain types of the disclosed credentials.
    pub credential_types: Vec<String>,
    /// DID of the verifier the presentation answered.
    pub verifier_did: String,
    /// Holder app the request was issued through.
    pub holder_app_id: Uuid,
    /// Issuers acceptable for the request; present only on
    /// credential-bearing verdicts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuers: Option<HashMap<String, IssuerInfo>>,
    /// The answered presentation request.
    pub presentation_request_id: Uuid,
}

/// Body of every 2xx verification response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResponse {
    /// Always true on the 2xx path; rejections surface as errors.
    pub is_verified: bool,
    /// The verdict kind.
    #[serde(rename = "type")]
    #[schema(value_type = String)]
    pub kind: VerdictKind,
    /// Receipt summary for the caller.
    pub receipt: PresentationReceipt,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run the verification pipeline for a routed inbound envelope.
pub async fn verify(
    state: &AppState,
    inbound: InboundPresentation,
    version: &ProtocolVersion,
) -> Result<VerificationResponse, AppError> {
    match inbound {
        InboundPresentation::V1(envelope) => verify_v1(state, envelope, version).await,
        InboundPresentation::Encrypted(envelope) => verify_encrypted(state, envelope, version).await,
    }
}

/// Legacy v1 path: the plaintext envelope goes to the authority as-is.
async fn verify_v1(
    state: &AppState,
    envelope: PresentationEnvelopeV1,
    version: &ProtocolVersion,
) -> Result<VerificationResponse, AppError> {
    let request_id = envelope.presentation_request_id();
    let (request, verifier) = load_context(state, &request_id)?;
    let auth_token = current_token(state, &verifier)?;

    match envelope {
        PresentationEnvelopeV1::Presentation(presentation) => {
            let body = VerifyPresentationBody {
                presentation,
                verifier: verifier.did.to_string(),
            };
            let result = state
                .authority
                .verify_presentation(&body, &auth_token, version)
                .await;
            let verdict = settle(state, &verifier, result)?;

            let kind = verdict.kind.unwrap_or(VerdictKind::VerifiablePresentation);
            let plaintext = verdict.presentation.unwrap_or(body.presentation);
            let credentials = plaintext.verifiable_credentials.clone();
            let plaintext_json = to_json(&plaintext)?;
            finish(state, &request, &verifier, kind, credentials, plaintext_json)
        }
        PresentationEnvelopeV1::NoPresentation(no_presentation) => {
            let body = VerifyNoPresentationBody {
                no_presentation,
                verifier: verifier.did.to_string(),
            };
            let result = state
                .authority
                .verify_no_presentation(&body, &auth_token, version)
                .await;
            let verdict = settle(state, &verifier, result)?;

            let kind = verdict.kind.unwrap_or(VerdictKind::NoPresentation);
            let plaintext = verdict.presentation.unwrap_or(body.no_presentation);
            let plaintext_json = to_json(&plaintext)?;
            finish(state, &request, &verifier, kind, Vec::new(), plaintext_json)
        }
    }
}

/// Encrypted v2+ path: the opaque envelope is opened by the authority,
/// which returns the decrypted presentation alongside the verdict.
async fn verify_encrypted(
    state: &AppState,
    envelope: EncryptedEnvelope,
    version: &ProtocolVersion,
) -> Result<VerificationResponse, AppError> {
    let request_id = envelope.presentation_request_id();
    let (request, verifier) = load_context(state, &request_id)?;
    let auth_token = current_token(state, &verifier)?;

    let body = VerifyEncryptedPresentationBody {
        encrypted_presentation: envelope.encrypted_presentation,
        verifier: verifier.did.to_string(),
        encryption_private_key: verifier.encryption_key.clone(),
    };
    let result = state
        .authority
        .verify_encrypted_presentation(&body, &auth_token, version)
        .await;
    let verdict = settle(state, &verifier, result)?;

    let kind = verdict.kind.unwrap_or(VerdictKind::VerifiablePresentation);
    let (credentials, plaintext_json) = match verdict.presentation {
        Some(presentation) => {
            let credentials = presentation.verifiable_credential.clone();
            (credentials, to_json(&presentation)?)
        }
        None => (Vec::new(), serde_json::Value::Null),
    };
    finish(state, &request, &verifier, kind, credentials, plaintext_json)
}

// ---------------------------------------------------------------------------
// Acts
// ---------------------------------------------------------------------------

/// Load the presentation request and its verifier.
fn load_context(
    state: &AppState,
    request_id: &Uuid,
) -> Result<(PresentationRequestRecord, VerifierRecord), AppError> {
    let request = state
        .presentation_requests
        .get(request_id)
        .ok_or_else(|| AppError::NotFound(format!("presentation request {request_id} not found")))?;
    let verifier = state
        .verifiers
        .get(&request.verifier_id)
        .ok_or_else(|| AppError::NotFound(format!("verifier {} not found", request.verifier_id)))?;
    Ok((request, verifier))
}

/// Read the verifier's current auth token from the custodian.
fn current_token(state: &AppState, verifier: &VerifierRecord) -> Result<String, AppError> {
    state
        .tokens
        .current(&verifier.id)
        .ok_or_else(|| AppError::NotFound(format!("verifier {} not found", verifier.id)))
}

/// Apply token rotation and map the authority's result onto the error
/// taxonomy.
///
/// Rotation happens before any return: reissued tokens ride on successes
/// and on rejection replies alike. Transport errors never reached the
/// authority's token issuance, so nothing rotates for them.
fn settle<P>(
    state: &AppState,
    verifier: &VerifierRecord,
    result: Result<AuthorityReply<P>, AuthorityError>,
) -> Result<AuthorityVerdict<P>, AppError> {
    match result {
        Ok(reply) => {
            apply_rotation(state, verifier, reply.rotated_token.as_deref());
            if !reply.verdict.is_verified {
                let message = reply
                    .verdict
                    .message
                    .unwrap_or_else(|| "presentation could not be verified".to_string());
                return Err(AppError::VerificationRejected(format!(
                    "verification failed: {message}"
                )));
            }
            Ok(reply.verdict)
        }
        Err(AuthorityError::Api {
            status,
            body,
            rotated_token,
            ..
        }) => {
            apply_rotation(state, verifier, rotated_token.as_deref());
            if (400..500).contains(&status) {
                Err(AppError::VerificationRejected(format!(
                    "verification failed: {body}"
                )))
            } else {
                Err(AppError::Upstream(format!(
                    "authority returned {status}: {body}"
                )))
            }
        }
        Err(err) => Err(AppError::Upstream(err.to_string())),
    }
}

/// Rotate the verifier token when the reply reissued a different value.
fn apply_rotation(state: &AppState, verifier: &VerifierRecord, rotated_token: Option<&str>) {
    if let Some(new_token) = rotated_token {
        if new_token != verifier.auth_token {
            state.tokens.rotate(&verifier.id, new_token);
        }
    }
}

/// Record disclosures for credential-bearing verdicts, assemble the
/// receipt, and publish the verdict to the correlated user.
fn finish(
    state: &AppState,
    request: &PresentationRequestRecord,
    verifier: &VerifierRecord,
    kind: VerdictKind,
    credentials: Vec<Credential>,
    plaintext: serde_json::Value,
) -> Result<VerificationResponse, AppError> {
    if kind.carries_credentials() && !credentials.is_empty() {
        let persisted = disclosure::record_disclosures(state, verifier.id, &credentials)?;
        tracing::info!(request_id = %request.id, persisted, "recorded disclosed credentials");
    }

    let info = extract_credential_info(&credentials);
    let receipt = PresentationReceipt {
        subject_did: info.subject_did,
        credential_types: info.credential_types,
        verifier_did: verifier.did.to_string(),
        holder_app_id: request.holder_app_id,
        issuers: kind
            .carries_credentials()
            .then(|| request.issuer_info.clone()),
        presentation_request_id: request.id,
    };

    notify::publish_detached(
        state.presentation_requests.clone(),
        state.channels.clone(),
        VerdictEvent {
            presentation_request_id: request.id,
            is_verified: true,
            kind,
            presentation: plaintext,
        },
    );

    Ok(VerificationResponse {
        is_verified: true,
        kind,
        receipt,
    })
}

/// Serialize a plaintext payload for the notification channel.
fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value, AppError> {
    serde_json::to_value(value)
        .map_err(|e| AppError::Internal(format!("presentation serialization failed: {e}")))
}
