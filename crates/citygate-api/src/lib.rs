//! # citygate-api — Axum Gate Service for the CityGate Platform
//!
//! A stateless authentication-and-authorization gate in front of the civic
//! sensing API. Every inbound request passes through the gate middleware,
//! which resolves the caller's identity from an optional bearer credential
//! and evaluates the ordered access-rule list before any handler runs.
//!
//! ## API Surface
//!
//! | Prefix                 | Module                 | Access                          |
//! |------------------------|------------------------|---------------------------------|
//! | `/api/v1/sensors/*`    | [`routes::sensors`]    | GET: any role; POST: Admin/Operator |
//! | `/api/v1/incidents/*`  | [`routes::incidents`]  | report: any identity; triage: staff roles |
//! | `/api/v1/seed/*`       | [`routes::seed`]       | public (demo data)              |
//! | `/health/*`            | liveness/readiness     | public by rule                  |
//! | `/openapi.json`        | [`openapi`]            | public by rule                  |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → CorsLayer → GateMiddleware → Handler
//! ```
//!
//! Unlike services that mount health probes outside the authenticated
//! router, everything here is routed through the gate: the rule list is the
//! single source of truth for which paths are public.

pub mod auth;
pub mod error;
pub mod extractors;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::middleware::from_fn;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub use error::AppError;

/// Assemble the full application router with all routes and middleware.
///
/// The gate middleware wraps every route, including health probes and the
/// OpenAPI document; those stay reachable without credentials because the
/// default rule list marks them public, not because they bypass the gate.
pub fn app(state: AppState) -> Router {
    let gate = state.gate.clone();

    Router::new()
        .merge(routes::sensors::router())
        .merge(routes::incidents::router())
        .merge(routes::seed::router())
        .merge(openapi::router())
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness))
        .layer(from_fn(auth::gate_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(axum::Extension(gate))
        .with_state(state)
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — returns 200 when the application is ready to serve.
async fn readiness() -> &'static str {
    "ready"
}
