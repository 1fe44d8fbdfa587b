//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`. The document route is public by access rule,
//! not by bypassing the gate.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "CityGate API",
        version = "0.1.0",
        description = "Civic sensing API behind the CityGate authentication-and-authorization gate: sensors, incident reports, and demo seeding.",
        license(name = "Apache-2.0")
    ),
    paths(
        // Sensors
        crate::routes::sensors::list_sensors,
        crate::routes::sensors::get_sensor,
        crate::routes::sensors::create_sensor,
        // Incidents
        crate::routes::incidents::report_incident,
        crate::routes::incidents::list_incidents,
        crate::routes::incidents::assign_incident,
        // Seed
        crate::routes::seed::seed_sensors,
    ),
    components(schemas(
        // State record types
        crate::state::SensorRecord,
        crate::state::SensorKind,
        crate::state::SensorStatus,
        crate::state::IncidentRecord,
        crate::state::IncidentSeverity,
        crate::state::IncidentStatus,
        // Error types
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        // DTOs
        crate::routes::sensors::CreateSensorRequest,
        crate::routes::sensors::SensorListResponse,
        crate::routes::incidents::ReportIncidentRequest,
        crate::routes::incidents::AssignIncidentRequest,
        crate::routes::incidents::IncidentListResponse,
        crate::routes::seed::SeedResponse,
    )),
    tags(
        (name = "sensors", description = "City sensor registry"),
        (name = "incidents", description = "Incident reports and triage"),
        (name = "seed", description = "Demo data seeding"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
///
/// Serves the OpenAPI JSON spec at `/openapi.json`.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
