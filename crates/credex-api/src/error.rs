//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps pipeline errors to HTTP status codes and returns JSON error
//! response bodies with a machine-readable code and a message. Internal
//! and upstream details are logged but never exposed in responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use credex_core::ValidationError;

/// Structured JSON error response body.
///
/// All error responses use this format for consistency across the API
/// surface.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "PROTOCOL_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
///
/// One variant per failure class of the verification pipeline:
///
/// - [`AppError::Protocol`] — malformed or unsupported version, or a call
///   that reached the wrong endpoint. Always raised before any external
///   call.
/// - [`AppError::NotFound`] — missing presentation request or verifier.
/// - [`AppError::VerificationRejected`] — the authority declared the
///   presentation invalid. Nothing is persisted; token rotation has
///   already been applied when present.
/// - [`AppError::Resolution`] — the cryptographic verification succeeded
///   but a disclosed credential's issuer/subject could not be matched to
///   local records, so the whole disclosure step failed.
/// - [`AppError::Upstream`] — transport failure or malfunction of the
///   verification authority. Never retried.
/// - [`AppError::Internal`] — anything else; message is logged but not
///   returned to the client.
#[derive(Error, Debug)]
pub enum AppError {
    /// Protocol/version routing error (400).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// The authority rejected the presentation (400).
    #[error("verification rejected: {0}")]
    VerificationRejected(String),

    /// Local identity resolution failed after successful verification (500).
    #[error("resolution failure: {0}")]
    Resolution(String),

    /// The verification authority failed or was unreachable (502).
    #[error("upstream authority error: {0}")]
    Upstream(String),

    /// Internal server error (500). Message is logged but not returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Protocol(_) => (StatusCode::BAD_REQUEST, "PROTOCOL_ERROR"),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::VerificationRejected(_) => (StatusCode::BAD_REQUEST, "VERIFICATION_FAILED"),
            Self::Resolution(_) => (StatusCode::INTERNAL_SERVER_ERROR, "RESOLUTION_FAILURE"),
            Self::Upstream(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Never expose internal or upstream details to clients.
        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            Self::Upstream(_) => "The verification authority could not complete the call".to_string(),
            other => other.to_string(),
        };

        match &self {
            Self::Internal(_) | Self::Resolution(_) => {
                tracing::error!(error = %self, "verification pipeline error");
            }
            Self::Upstream(_) => {
                tracing::error!(error = %self, "verification authority error");
            }
            Self::VerificationRejected(_) => {
                tracing::warn!(error = %self, "presentation verification rejected");
            }
            _ => {}
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Version/DID validation failures at the routing boundary are protocol
/// errors; the disclosure step maps DID failures to [`AppError::Resolution`]
/// explicitly instead of using this conversion.
impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::Protocol(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_status_code() {
        let err = AppError::Protocol("bad version header".to_string());
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "PROTOCOL_ERROR");
    }

    #[test]
    fn not_found_status_code() {
        let err = AppError::NotFound("missing request".to_string());
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(code, "NOT_FOUND");
    }

    #[test]
    fn verification_rejected_status_code() {
        let err = AppError::VerificationRejected("proof invalid".to_string());
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "VERIFICATION_FAILED");
    }

    #[test]
    fn resolution_status_code_is_distinct_from_rejection() {
        let err = AppError::Resolution("no issuer registered".to_string());
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "RESOLUTION_FAILURE");
    }

    #[test]
    fn upstream_status_code() {
        let err = AppError::Upstream("connection refused".to_string());
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(code, "UPSTREAM_ERROR");
    }

    #[test]
    fn validation_error_converts_to_protocol() {
        let err = AppError::from(ValidationError::InvalidVersion("garbage".to_string()));
        match &err {
            AppError::Protocol(msg) => assert!(msg.contains("garbage")),
            other => panic!("expected Protocol, got: {other:?}"),
        }
    }

    // ── into_response tests ──────────────────────────────────────

    use http_body_util::BodyExt;

    /// Helper to extract status and body from a Response.
    async fn response_parts(err: AppError) -> (StatusCode, ErrorBody) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    #[tokio::test]
    async fn into_response_rejection_keeps_message() {
        let (status, body) =
            response_parts(AppError::VerificationRejected("signature mismatch".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error.code, "VERIFICATION_FAILED");
        assert!(body.error.message.contains("signature mismatch"));
    }

    #[tokio::test]
    async fn into_response_upstream_hides_details() {
        let (status, body) =
            response_parts(AppError::Upstream("tcp connect error 10.0.0.3:443".into())).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body.error.code, "UPSTREAM_ERROR");
        assert!(
            !body.error.message.contains("10.0.0.3"),
            "upstream detail must not leak: {}",
            body.error.message
        );
    }

    #[tokio::test]
    async fn into_response_internal_hides_details() {
        let (status, body) = response_parts(AppError::Internal("lock poisoned".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error.code, "INTERNAL_ERROR");
        assert_eq!(body.error.message, "An internal error occurred");
    }

    #[tokio::test]
    async fn into_response_resolution_keeps_message() {
        let (status, body) = response_parts(AppError::Resolution(
            "no issuer registered for did:cx:issuer-9".into(),
        ))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error.code, "RESOLUTION_FAILURE");
        assert!(body.error.message.contains("did:cx:issuer-9"));
    }
}
