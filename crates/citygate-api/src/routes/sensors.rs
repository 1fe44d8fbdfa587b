//! Sensor registry routes.
//!
//! Reads are open to every declared role (by route rule); registration is
//! restricted to Admin and Operator at the method level.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use citygate_core::Role;

use crate::auth::{require_any_role, Caller};
use crate::error::{AppError, ErrorBody};
use crate::extractors::{extract_validated_json, Validate};
use crate::state::{AppState, SensorKind, SensorRecord, SensorStatus};

/// Request body for registering a sensor.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSensorRequest {
    /// Human-readable name.
    pub name: String,
    /// Sensor kind.
    pub kind: SensorKind,
    /// District the sensor is installed in.
    pub district: String,
}

impl Validate for CreateSensorRequest {
    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("sensor name must not be empty".to_string());
        }
        if self.district.trim().is_empty() {
            return Err("district must not be empty".to_string());
        }
        Ok(())
    }
}

/// Response listing sensors.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SensorListResponse {
    /// All registered sensors.
    pub sensors: Vec<SensorRecord>,
}

/// Build the sensors sub-router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/sensors", get(list_sensors).post(create_sensor))
        .route("/api/v1/sensors/:id", get(get_sensor))
}

/// List all registered sensors.
#[utoipa::path(
    get,
    path = "/api/v1/sensors",
    tag = "sensors",
    responses(
        (status = 200, description = "All registered sensors", body = SensorListResponse),
        (status = 401, description = "No valid identity", body = ErrorBody),
    )
)]
async fn list_sensors(State(state): State<AppState>) -> Json<SensorListResponse> {
    Json(SensorListResponse {
        sensors: state.sensors.list(),
    })
}

/// Fetch a single sensor by ID.
#[utoipa::path(
    get,
    path = "/api/v1/sensors/{id}",
    tag = "sensors",
    params(("id" = Uuid, Path, description = "Sensor ID")),
    responses(
        (status = 200, description = "The sensor", body = SensorRecord),
        (status = 404, description = "Unknown sensor", body = ErrorBody),
    )
)]
async fn get_sensor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SensorRecord>, AppError> {
    state
        .sensors
        .get(&id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("sensor {id}")))
}

/// Register a new sensor. Admin or Operator only.
#[utoipa::path(
    post,
    path = "/api/v1/sensors",
    tag = "sensors",
    request_body = CreateSensorRequest,
    responses(
        (status = 201, description = "Sensor registered", body = SensorRecord),
        (status = 403, description = "Caller role may not register sensors", body = ErrorBody),
        (status = 422, description = "Validation failed", body = ErrorBody),
    )
)]
async fn create_sensor(
    State(state): State<AppState>,
    caller: Caller,
    body: Result<Json<CreateSensorRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SensorRecord>), AppError> {
    require_any_role(&caller, &[Role::Admin, Role::Operator])?;
    let request = extract_validated_json(body)?;

    let now = Utc::now();
    let record = SensorRecord {
        id: Uuid::new_v4(),
        name: request.name,
        kind: request.kind,
        district: request.district,
        status: SensorStatus::Active,
        last_reading: None,
        created_at: now,
        updated_at: now,
    };
    state.sensors.insert(record.id, record.clone());

    tracing::info!(sensor_id = %record.id, registered_by = %caller.0.subject, "sensor registered");
    Ok((StatusCode::CREATED, Json(record)))
}
