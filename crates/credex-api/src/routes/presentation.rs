//! # Presentation Verification Endpoints
//!
//! Inbound surface of the verification pipeline:
//!
//! - `POST /presentation` — legacy endpoint. Dispatches on the `version`
//!   header: pre-2.0.0 bodies take the plaintext v1 path, 2.x bodies the
//!   encrypted path. 3.0.0+ callers are rejected with an explicit routing
//!   error — never silently coerced.
//! - `POST /presentationV2` — encrypted envelope endpoint for 2.x callers.
//! - `POST /presentationV3` — dedicated endpoint for 3.0.0+ callers.
//!
//! The version header is resolved and validated here, before anything
//! else happens; malformed versions never reach the external authority.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};

use credex_core::{ProtocolGeneration, ProtocolVersion};

use crate::envelope::{EncryptedEnvelope, InboundPresentation, PresentationEnvelopeV1};
use crate::error::AppError;
use crate::pipeline::{self, VerificationResponse};
use crate::state::AppState;

/// Build the presentation router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/presentation", post(create_presentation))
        .route("/presentationV2", post(create_presentation_v2))
        .route("/presentationV3", post(create_presentation_v3))
}

/// Resolve the declared protocol version from the `version` header.
fn declared_version(
    headers: &HeaderMap,
    default: ProtocolVersion,
) -> Result<ProtocolVersion, AppError> {
    let raw = headers
        .get("version")
        .map(|value| {
            value
                .to_str()
                .map_err(|_| AppError::Protocol("version header is not valid UTF-8".to_string()))
        })
        .transpose()?;
    ProtocolVersion::from_header(raw, default).map_err(Into::into)
}

/// POST /presentation — legacy endpoint, header-dispatched.
///
/// Absent version headers default to the oldest supported version
/// (1.0.0), preserving backward compatibility with holder apps that
/// predate the header.
#[utoipa::path(
    post,
    path = "/presentation",
    params(
        ("version" = Option<String>, Header,
            description = "Declared wire-protocol version (strict semver). Defaults to 1.0.0.")
    ),
    request_body = serde_json::Value,
    responses(
        (status = 200, description = "Presentation verified", body = VerificationResponse),
        (status = 400, description = "Protocol error or verification rejected", body = crate::error::ErrorBody),
        (status = 404, description = "Unknown presentation request or verifier", body = crate::error::ErrorBody),
        (status = 500, description = "Disclosure resolution failure", body = crate::error::ErrorBody),
        (status = 502, description = "Verification authority failure", body = crate::error::ErrorBody),
    ),
    tag = "presentation"
)]
pub(crate) async fn create_presentation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<VerificationResponse>, AppError> {
    let version = declared_version(&headers, ProtocolVersion::oldest_supported())?;
    tracing::info!(%version, "presentation received on legacy endpoint");

    let inbound = match version.generation() {
        ProtocolGeneration::LegacyV1 => {
            InboundPresentation::V1(PresentationEnvelopeV1::from_json(body)?)
        }
        ProtocolGeneration::EncryptedV2 => {
            InboundPresentation::Encrypted(EncryptedEnvelope::from_json(body)?)
        }
        ProtocolGeneration::DedicatedV3 => {
            return Err(AppError::Protocol(format!(
                "version {version} is not served here; use the v3 endpoint (/presentationV3) directly"
            )));
        }
    };

    pipeline::verify(&state, inbound, &version).await.map(Json)
}

/// POST /presentationV2 — encrypted envelope endpoint for 2.x callers.
///
/// Absent version headers default to 2.0.0, the generation this endpoint
/// serves.
#[utoipa::path(
    post,
    path = "/presentationV2",
    params(
        ("version" = Option<String>, Header,
            description = "Declared wire-protocol version (strict semver). Defaults to 2.0.0.")
    ),
    request_body = serde_json::Value,
    responses(
        (status = 200, description = "Presentation verified", body = VerificationResponse),
        (status = 400, description = "Protocol error or verification rejected", body = crate::error::ErrorBody),
        (status = 404, description = "Unknown presentation request or verifier", body = crate::error::ErrorBody),
        (status = 500, description = "Disclosure resolution failure", body = crate::error::ErrorBody),
        (status = 502, description = "Verification authority failure", body = crate::error::ErrorBody),
    ),
    tag = "presentation"
)]
pub(crate) async fn create_presentation_v2(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<VerificationResponse>, AppError> {
    let version = declared_version(&headers, ProtocolVersion::v2_floor())?;
    match version.generation() {
        ProtocolGeneration::EncryptedV2 => {}
        ProtocolGeneration::LegacyV1 => {
            return Err(AppError::Protocol(format!(
                "version {version} predates the encrypted envelope; use the legacy /presentation endpoint"
            )));
        }
        ProtocolGeneration::DedicatedV3 => {
            return Err(AppError::Protocol(format!(
                "version {version} is not served here; use the v3 endpoint (/presentationV3) directly"
            )));
        }
    }
    tracing::info!(%version, "presentation received on v2 endpoint");

    let inbound = InboundPresentation::Encrypted(EncryptedEnvelope::from_json(body)?);
    pipeline::verify(&state, inbound, &version).await.map(Json)
}

/// POST /presentationV3 — dedicated endpoint for 3.0.0+ callers.
///
/// Absent version headers default to 3.0.0. Earlier generations are
/// redirected to their own endpoints with an explicit routing error.
#[utoipa::path(
    post,
    path = "/presentationV3",
    params(
        ("version" = Option<String>, Header,
            description = "Declared wire-protocol version (strict semver). Defaults to 3.0.0.")
    ),
    request_body = serde_json::Value,
    responses(
        (status = 200, description = "Presentation verified", body = VerificationResponse),
        (status = 400, description = "Protocol error or verification rejected", body = crate::error::ErrorBody),
        (status = 404, description = "Unknown presentation request or verifier", body = crate::error::ErrorBody),
        (status = 500, description = "Disclosure resolution failure", body = crate::error::ErrorBody),
        (status = 502, description = "Verification authority failure", body = crate::error::ErrorBody),
    ),
    tag = "presentation"
)]
pub(crate) async fn create_presentation_v3(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<VerificationResponse>, AppError> {
    let version = declared_version(&headers, ProtocolVersion::v3_floor())?;
    if version.generation() != ProtocolGeneration::DedicatedV3 {
        return Err(AppError::Protocol(format!(
            "version {version} is not served here; use /presentation or /presentationV2"
        )));
    }
    tracing::info!(%version, "presentation received on v3 endpoint");

    let inbound = InboundPresentation::Encrypted(EncryptedEnvelope::from_json(body)?);
    pipeline::verify(&state, inbound, &version).await.map(Json)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
