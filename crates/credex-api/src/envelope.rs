//! # Inbound Envelope Union
//!
//! The version-tagged union of inbound presentation bodies, resolved
//! exactly once at the version-router boundary. Each protocol generation
//! has its own strict shape; nothing downstream of this module handles
//! raw JSON.

use serde::Deserialize;
use uuid::Uuid;

use credex_core::{EncryptedData, NoPresentation, Presentation};

use crate::error::AppError;

/// A v1 plaintext envelope: either a credential-bearing presentation or a
/// signed no-presentation receipt, discriminated on `type[0]`.
#[derive(Debug, Clone)]
pub enum PresentationEnvelopeV1 {
    /// A credential-bearing presentation.
    Presentation(Presentation),
    /// A signed receipt declining to present.
    NoPresentation(NoPresentation),
}

impl PresentationEnvelopeV1 {
    /// Parse a v1 body, discriminating on the leading `type` entry.
    pub fn from_json(value: serde_json::Value) -> Result<Self, AppError> {
        let type_tag = value
            .get("type")
            .and_then(|t| t.get(0))
            .and_then(|t| t.as_str())
            .ok_or_else(|| {
                AppError::Protocol("presentation body is missing its type tag".to_string())
            })?;

        match type_tag {
            "VerifiablePresentation" => serde_json::from_value(value)
                .map(Self::Presentation)
                .map_err(|e| AppError::Protocol(format!("malformed v1 presentation: {e}"))),
            "NoPresentation" => serde_json::from_value(value)
                .map(Self::NoPresentation)
                .map_err(|e| AppError::Protocol(format!("malformed v1 no-presentation: {e}"))),
            other => Err(AppError::Protocol(format!(
                "unrecognized presentation type: {other}"
            ))),
        }
    }

    /// The outstanding request this envelope is bound to.
    pub fn presentation_request_id(&self) -> Uuid {
        match self {
            Self::Presentation(p) => p.presentation_request_id,
            Self::NoPresentation(np) => np.presentation_request_id,
        }
    }
}

/// Reference to the outstanding request inside a v2+ envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationRequestRef {
    pub id: Uuid,
}

/// Request context wrapper inside a v2+ envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationRequestInfo {
    pub presentation_request: PresentationRequestRef,
}

/// A v2+ encrypted envelope: request context plus an opaque ciphertext.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedEnvelope {
    pub presentation_request_info: PresentationRequestInfo,
    pub encrypted_presentation: EncryptedData,
}

impl EncryptedEnvelope {
    /// Parse a v2+ body.
    pub fn from_json(value: serde_json::Value) -> Result<Self, AppError> {
        serde_json::from_value(value)
            .map_err(|e| AppError::Protocol(format!("malformed encrypted envelope: {e}")))
    }

    /// The outstanding request this envelope answers.
    pub fn presentation_request_id(&self) -> Uuid {
        self.presentation_request_info.presentation_request.id
    }
}

/// An inbound presentation with its protocol generation resolved.
#[derive(Debug, Clone)]
pub enum InboundPresentation {
    /// Pre-2.0.0 plaintext envelope.
    V1(PresentationEnvelopeV1),
    /// 2.0.0+ encrypted envelope.
    Encrypted(EncryptedEnvelope),
}
