//! # OpenAPI Specification Assembly
//!
//! Assembles the utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Credex API — Presentation Verification",
        version = "0.3.2",
        description = "Credential-exchange verification pipeline: receives holder presentations across three wire-protocol generations, forwards them to the external verification authority, records disclosures, and notifies the correlated user.",
        license(name = "MIT")
    ),
    paths(
        crate::routes::presentation::create_presentation,
        crate::routes::presentation::create_presentation_v2,
        crate::routes::presentation::create_presentation_v3,
    ),
    components(schemas(
        crate::pipeline::VerificationResponse,
        crate::pipeline::PresentationReceipt,
        crate::state::IssuerInfo,
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "presentation", description = "Presentation verification endpoints")
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
