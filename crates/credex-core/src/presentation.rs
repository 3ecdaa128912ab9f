//! # Presentation Data Model
//!
//! Wire shapes for holder presentations across the protocol generations,
//! the disclosed [`Credential`] payload, and the normalized verdict
//! vocabulary. Each generation has its own strict type; the version router
//! picks one exactly once at the boundary.
//!
//! Cryptographic material ([`Proof`], [`EncryptedData`]) is transported
//! opaquely — signature and encryption schemes are the external
//! verification authority's concern.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of a verification verdict.
///
/// v1 callers only ever produce `VerifiablePresentation` and
/// `NoPresentation`; the v2 encrypted path widened the vocabulary with
/// `Declined` and `Report`. Only `VerifiablePresentation` carries
/// disclosable credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerdictKind {
    /// A signed presentation disclosing one or more credentials.
    VerifiablePresentation,
    /// The holder responded without presenting credentials.
    NoPresentation,
    /// The holder explicitly declined the request.
    Declined,
    /// An informational receipt with no credential content.
    Report,
}

impl VerdictKind {
    /// Whether verdicts of this kind can carry disclosed credentials.
    pub fn carries_credentials(&self) -> bool {
        matches!(self, Self::VerifiablePresentation)
    }
}

impl std::fmt::Display for VerdictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::VerifiablePresentation => "VerifiablePresentation",
            Self::NoPresentation => "NoPresentation",
            Self::Declined => "Declined",
            Self::Report => "Report",
        };
        f.write_str(s)
    }
}

/// A linked-data signature attached to a presentation or credential.
///
/// Carried verbatim; never validated locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    /// Signature creation time, as the signer formatted it.
    pub created: String,
    /// The encoded signature value.
    pub signature_value: String,
    /// Signature suite identifier.
    #[serde(rename = "type")]
    pub proof_type: String,
    /// DID URL of the key that produced the signature.
    pub verification_method: String,
    /// Purpose the signature asserts (e.g. `assertionMethod`).
    pub proof_purpose: String,
}

/// A disclosed verifiable credential.
///
/// The subject is kept as raw JSON because v2 holder apps serialize it as a
/// JSON-encoded *string* while v1 apps send an object; [`Credential::subject_did`]
/// absorbs both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    /// JSON-LD context.
    #[serde(rename = "@context", default)]
    pub context: Vec<String>,
    /// Credential type list; first entry is `VerifiableCredential`.
    #[serde(rename = "type")]
    pub types: Vec<String>,
    /// Credential identifier assigned by the issuer.
    pub id: String,
    /// DID of the issuing party; may carry a `#fragment` key identifier.
    pub issuer: String,
    /// The claims object, or a JSON-encoded string of it (v2 apps).
    pub credential_subject: serde_json::Value,
    /// Revocation/status reference, carried opaquely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_status: Option<serde_json::Value>,
    /// When the credential was issued.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuance_date: Option<DateTime<Utc>>,
    /// When the credential expires, if it does.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,
    /// Issuer signature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<Proof>,
}

impl Credential {
    /// The subject DID claimed by this credential, if one is present.
    ///
    /// Handles both subject encodings: an object with an `id` member, and
    /// the v2 form where the whole subject is a JSON-encoded string.
    /// The returned DID may still carry a `#fragment`.
    pub fn subject_did(&self) -> Option<String> {
        let object = match &self.credential_subject {
            serde_json::Value::String(raw) => serde_json::from_str(raw).ok()?,
            other => other.clone(),
        };
        object
            .get("id")
            .and_then(|id| id.as_str())
            .map(str::to_string)
    }

    /// The domain type of this credential: the first entry of `type` that
    /// is not the generic `VerifiableCredential` marker.
    pub fn domain_type(&self) -> Option<&str> {
        self.types
            .iter()
            .map(String::as_str)
            .find(|t| *t != "VerifiableCredential")
    }
}

/// A v1 plaintext presentation, bound to its request by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    /// JSON-LD context.
    #[serde(rename = "@context", default)]
    pub context: Vec<String>,
    /// Type list; first entry is `VerifiablePresentation`.
    #[serde(rename = "type")]
    pub types: Vec<String>,
    /// The outstanding request this presentation answers.
    pub presentation_request_id: Uuid,
    /// Credentials disclosed by the holder.
    #[serde(default)]
    pub verifiable_credentials: Vec<Credential>,
    /// Holder signature over the presentation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<Proof>,
}

/// A v1 "no presentation" receipt — the holder answered the request
/// without disclosing credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoPresentation {
    /// Type list; first entry is `NoPresentation`.
    #[serde(rename = "type")]
    pub types: Vec<String>,
    /// The outstanding request this receipt answers.
    pub presentation_request_id: Uuid,
    /// DID of the responding holder.
    pub holder: String,
    /// Holder signature over the receipt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<Proof>,
}

/// A v2+ plaintext presentation, as decrypted by the authority.
///
/// Differs from the v1 shape: the credential list is `verifiableCredential`
/// (singular, per the W3C VP vocabulary) and request binding travels in the
/// surrounding envelope rather than the presentation body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationV2 {
    /// JSON-LD context.
    #[serde(rename = "@context", default)]
    pub context: Vec<String>,
    /// Type list; first entry is `VerifiablePresentation`.
    #[serde(rename = "type")]
    pub types: Vec<String>,
    /// Credentials disclosed by the holder; empty for declined responses.
    #[serde(default)]
    pub verifiable_credential: Vec<Credential>,
    /// Request binding, when the authority echoes it into the body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presentation_request_id: Option<Uuid>,
    /// DID of the verifier the presentation was addressed to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verifier_did: Option<String>,
    /// Holder signature over the presentation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<Proof>,
}

/// Key material for one encrypted payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedKey {
    /// Initialization vector, encoded.
    pub iv: String,
    /// Ephemeral public key used for the key agreement.
    pub ephemeral_public_key: String,
    /// The wrapped symmetric key.
    pub encrypted_key: String,
    /// Encryption algorithm identifier.
    pub algorithm: String,
}

/// An opaque encrypted payload: ciphertext plus its wrapped key.
///
/// Decryption is performed by the external authority with the verifier's
/// encryption key; this service never opens it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedData {
    /// Base64-encoded ciphertext.
    pub data: String,
    /// Key material for the ciphertext.
    pub key: EncryptedKey,
}

/// Credential summary extracted from a presentation for receipts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialInfo {
    /// Subject DID shared by the disclosed credentials, if any.
    pub subject_did: Option<String>,
    /// Domain types of the disclosed credentials.
    pub credential_types: Vec<String>,
}

/// Summarize disclosed credentials: the subject they are about and their
/// domain types. Used for receipts and observability only; disclosure
/// recording works from the full [`Credential`] values.
pub fn extract_credential_info(credentials: &[Credential]) -> CredentialInfo {
    CredentialInfo {
        subject_did: credentials.iter().find_map(Credential::subject_did),
        credential_types: credentials
            .iter()
            .filter_map(|c| c.domain_type().map(str::to_string))
            .collect(),
    }
}
