//! # API Route Modules
//!
//! - `presentation` — the presentation verification endpoints, one per
//!   protocol generation surface: the legacy header-dispatched endpoint,
//!   the v2 encrypted endpoint, and the dedicated v3 endpoint.

pub mod presentation;
