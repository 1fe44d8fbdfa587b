//! Incident report routes.
//!
//! Any authenticated caller may file a report; listing and triage are
//! staff-role operations checked at the method level.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use citygate_core::Role;

use crate::auth::{require_any_role, Caller};
use crate::error::{AppError, ErrorBody};
use crate::extractors::{extract_validated_json, Validate};
use crate::state::{AppState, IncidentRecord, IncidentSeverity, IncidentStatus};

/// Request body for filing an incident report.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReportIncidentRequest {
    /// Short summary.
    pub title: String,
    /// Full description.
    pub description: String,
    /// Severity classification.
    pub severity: IncidentSeverity,
}

impl Validate for ReportIncidentRequest {
    fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("incident title must not be empty".to_string());
        }
        if self.description.trim().is_empty() {
            return Err("incident description must not be empty".to_string());
        }
        Ok(())
    }
}

/// Request body for assigning an incident to a responder.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignIncidentRequest {
    /// Subject id of the responder to assign.
    pub responder: String,
}

impl Validate for AssignIncidentRequest {
    fn validate(&self) -> Result<(), String> {
        if self.responder.trim().is_empty() {
            return Err("responder must not be empty".to_string());
        }
        Ok(())
    }
}

/// Response listing incident reports.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IncidentListResponse {
    /// All filed incidents.
    pub incidents: Vec<IncidentRecord>,
}

/// Build the incidents sub-router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/incidents",
            get(list_incidents).post(report_incident),
        )
        .route("/api/v1/incidents/:id/assign", post(assign_incident))
}

/// File an incident report. Any authenticated caller.
///
/// The reporter is taken from the verified identity, never from the body,
/// so a caller cannot file on someone else's behalf.
#[utoipa::path(
    post,
    path = "/api/v1/incidents",
    tag = "incidents",
    request_body = ReportIncidentRequest,
    responses(
        (status = 201, description = "Incident filed", body = IncidentRecord),
        (status = 401, description = "No valid identity", body = ErrorBody),
        (status = 422, description = "Validation failed", body = ErrorBody),
    )
)]
async fn report_incident(
    State(state): State<AppState>,
    caller: Caller,
    body: Result<Json<ReportIncidentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<IncidentRecord>), AppError> {
    let request = extract_validated_json(body)?;

    let now = Utc::now();
    let record = IncidentRecord {
        id: Uuid::new_v4(),
        title: request.title,
        description: request.description,
        severity: request.severity,
        status: IncidentStatus::Reported,
        reported_by: caller.0.subject.clone(),
        assigned_to: None,
        created_at: now,
        updated_at: now,
    };
    state.incidents.insert(record.id, record.clone());

    tracing::info!(incident_id = %record.id, reported_by = %record.reported_by, "incident filed");
    Ok((StatusCode::CREATED, Json(record)))
}

/// List all incident reports. Staff roles only.
#[utoipa::path(
    get,
    path = "/api/v1/incidents",
    tag = "incidents",
    responses(
        (status = 200, description = "All filed incidents", body = IncidentListResponse),
        (status = 403, description = "Caller role may not list incidents", body = ErrorBody),
    )
)]
async fn list_incidents(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<IncidentListResponse>, AppError> {
    require_any_role(&caller, &[Role::Admin, Role::Operator, Role::Responder])?;
    Ok(Json(IncidentListResponse {
        incidents: state.incidents.list(),
    }))
}

/// Assign an incident to a responder. Admin or Operator only.
#[utoipa::path(
    post,
    path = "/api/v1/incidents/{id}/assign",
    tag = "incidents",
    params(("id" = Uuid, Path, description = "Incident ID")),
    request_body = AssignIncidentRequest,
    responses(
        (status = 200, description = "Incident assigned", body = IncidentRecord),
        (status = 403, description = "Caller role may not assign incidents", body = ErrorBody),
        (status = 404, description = "Unknown incident", body = ErrorBody),
    )
)]
async fn assign_incident(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    body: Result<Json<AssignIncidentRequest>, JsonRejection>,
) -> Result<Json<IncidentRecord>, AppError> {
    require_any_role(&caller, &[Role::Admin, Role::Operator])?;
    let request = extract_validated_json(body)?;

    state
        .incidents
        .update(&id, |incident| {
            incident.assigned_to = Some(request.responder.clone());
            incident.status = IncidentStatus::Assigned;
            incident.updated_at = Utc::now();
        })
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("incident {id}")))
}
