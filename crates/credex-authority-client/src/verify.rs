//! # Verification Calls
//!
//! Request and reply types for the authority's verification endpoints,
//! one per protocol generation, plus the shared call plumbing.
//!
//! | Method | Path | Generation |
//! |--------|------|-----------|
//! | POST   | `/api/verifyPresentation` | v1 plaintext presentation |
//! | POST   | `/api/verifyNoPresentation` | v1 declined-response receipt |
//! | POST   | `/api/verifyEncryptedPresentation` | v2+ encrypted envelope |

use serde::{Deserialize, Serialize};

use credex_core::{
    EncryptedData, NoPresentation, Presentation, PresentationV2, ProtocolVersion, VerdictKind,
};

use crate::error::AuthorityError;
use crate::AuthorityClient;

/// Response header carrying a reissued verifier token.
const AUTH_TOKEN_HEADER: &str = "x-auth-token";

// -- Request bodies -----------------------------------------------------------

/// Body for `POST /api/verifyPresentation` (v1 plaintext).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPresentationBody {
    /// The holder's plaintext presentation.
    pub presentation: Presentation,
    /// DID of the verifier the presentation answers.
    pub verifier: String,
}

/// Body for `POST /api/verifyNoPresentation` (v1 declined receipt).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyNoPresentationBody {
    /// The holder's signed no-presentation receipt.
    pub no_presentation: NoPresentation,
    /// DID of the verifier the receipt answers.
    pub verifier: String,
}

/// Body for `POST /api/verifyEncryptedPresentation` (v2+).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyEncryptedPresentationBody {
    /// The opaque encrypted presentation envelope.
    pub encrypted_presentation: EncryptedData,
    /// DID of the verifier the presentation answers.
    pub verifier: String,
    /// The verifier's encryption private key, forwarded so the authority
    /// can open the envelope.
    pub encryption_private_key: String,
}

// -- Reply types --------------------------------------------------------------

/// The authority's verdict body.
///
/// `P` is the plaintext presentation shape of the generation being
/// verified ([`Presentation`], [`NoPresentation`], or [`PresentationV2`]).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(bound(deserialize = "P: serde::Deserialize<'de>"))]
pub struct AuthorityVerdict<P> {
    /// Whether the presentation verified cryptographically and against
    /// the outstanding request.
    pub is_verified: bool,
    /// Verdict kind; absent on some failure replies.
    #[serde(rename = "type", default)]
    pub kind: Option<VerdictKind>,
    /// The decrypted/plaintext presentation, when verification produced one.
    #[serde(default)]
    pub presentation: Option<P>,
    /// Failure detail when `is_verified` is false.
    #[serde(default)]
    pub message: Option<String>,
}

/// A complete authority reply: the verdict body plus the reissued token,
/// if the response carried one.
#[derive(Debug, Clone)]
pub struct AuthorityReply<P> {
    /// The parsed verdict body.
    pub verdict: AuthorityVerdict<P>,
    /// Reissued verifier token from the `x-auth-token` response header.
    pub rotated_token: Option<String>,
}

// -- Calls --------------------------------------------------------------------

impl AuthorityClient {
    /// Verify a v1 plaintext presentation.
    ///
    /// Calls `POST {base}/api/verifyPresentation`.
    pub async fn verify_presentation(
        &self,
        body: &VerifyPresentationBody,
        auth_token: &str,
        version: &ProtocolVersion,
    ) -> Result<AuthorityReply<Presentation>, AuthorityError> {
        self.post_verify("verifyPresentation", body, auth_token, version)
            .await
    }

    /// Verify a v1 no-presentation receipt.
    ///
    /// Calls `POST {base}/api/verifyNoPresentation`.
    pub async fn verify_no_presentation(
        &self,
        body: &VerifyNoPresentationBody,
        auth_token: &str,
        version: &ProtocolVersion,
    ) -> Result<AuthorityReply<NoPresentation>, AuthorityError> {
        self.post_verify("verifyNoPresentation", body, auth_token, version)
            .await
    }

    /// Verify a v2+ encrypted presentation envelope.
    ///
    /// Calls `POST {base}/api/verifyEncryptedPresentation`.
    pub async fn verify_encrypted_presentation(
        &self,
        body: &VerifyEncryptedPresentationBody,
        auth_token: &str,
        version: &ProtocolVersion,
    ) -> Result<AuthorityReply<PresentationV2>, AuthorityError> {
        self.post_verify("verifyEncryptedPresentation", body, auth_token, version)
            .await
    }

    /// Shared verification call plumbing.
    ///
    /// Sends exactly one request — a verification call must not be
    /// replayed, so transport failures are returned, not retried. The
    /// `x-auth-token` header is read off the response before the status is
    /// inspected, so rejections still carry the reissued token.
    async fn post_verify<B, P>(
        &self,
        operation: &str,
        body: &B,
        auth_token: &str,
        version: &ProtocolVersion,
    ) -> Result<AuthorityReply<P>, AuthorityError>
    where
        B: Serialize,
        P: serde::de::DeserializeOwned,
    {
        let endpoint = format!("POST /api/{operation}");
        let url = format!("{}api/{operation}", self.base_url);

        let response = self
            .http
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, bearer(auth_token))
            .header("version", version.to_string())
            .json(body)
            .send()
            .await
            .map_err(|e| AuthorityError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;

        let rotated_token = response
            .headers()
            .get(AUTH_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%endpoint, status, "authority rejected verification call");
            return Err(AuthorityError::Api {
                endpoint,
                status,
                body,
                rotated_token,
            });
        }

        let verdict = response
            .json()
            .await
            .map_err(|e| AuthorityError::Deserialization {
                endpoint,
                source: e,
            })?;

        Ok(AuthorityReply {
            verdict,
            rotated_token,
        })
    }
}

/// Normalize a stored token to the `Bearer` authorization form.
///
/// Tokens stored before the header rollover lack the `Bearer ` prefix;
/// both forms are accepted and sent normalized.
pub(crate) fn bearer(token: &str) -> String {
    if token.starts_with("Bearer ") {
        token.to_string()
    } else {
        format!("Bearer {token}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_prefixes_raw_tokens() {
        assert_eq!(bearer("abc123"), "Bearer abc123");
    }

    #[test]
    fn bearer_keeps_prefixed_tokens() {
        assert_eq!(bearer("Bearer abc123"), "Bearer abc123");
    }

    #[test]
    fn verdict_parses_without_presentation() {
        let verdict: AuthorityVerdict<Presentation> =
            serde_json::from_str(r#"{"isVerified": false, "message": "signature mismatch"}"#)
                .unwrap();
        assert!(!verdict.is_verified);
        assert!(verdict.kind.is_none());
        assert!(verdict.presentation.is_none());
        assert_eq!(verdict.message.as_deref(), Some("signature mismatch"));
    }
}
