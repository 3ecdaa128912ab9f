//! # credex-api — Axum API Service for the Credex Stack
//!
//! The presentation verification and credential-sharing pipeline: a
//! holder answers an outstanding presentation request, the pipeline
//! forwards the answer to the external verification authority, interprets
//! the verdict, persists one SharedCredential per disclosed credential,
//! and notifies the correlated user — across three incompatible
//! wire-protocol generations.
//!
//! ## API Surface
//!
//! | Endpoint              | Module                   | Generation |
//! |-----------------------|--------------------------|------------|
//! | `POST /presentation`  | [`routes::presentation`] | <2.0.0, header-dispatched to 2.x |
//! | `POST /presentationV2`| [`routes::presentation`] | 2.x |
//! | `POST /presentationV3`| [`routes::presentation`] | 3.0.0+ |
//! | `GET /openapi.json`   | [`openapi`]              | — |
//! | `GET /health/*`       | —                        | — |
//!
//! ## Pipeline
//!
//! ```text
//! Received → VersionRouted → Forwarding → {Verified → Recording → Notifying → Done
//!                                          | Rejected | ExternalError}
//! ```
//!
//! Each inbound call is processed at most once end-to-end; there are no
//! retries between states.

pub mod envelope;
pub mod error;
pub mod notify;
pub mod openapi;
pub mod pipeline;
pub mod routes;
pub mod state;
pub mod tokens;

mod disclosure;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the full application router.
///
/// Health probes (`/health/*`) are mounted outside the traced API routes
/// so probe traffic stays out of the request logs.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::presentation::router())
        .merge(openapi::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    Router::new().merge(health).merge(api)
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — returns 200 when the application is ready to serve.
async fn readiness() -> &'static str {
    "ready"
}
