//! Demo data seeding.
//!
//! Public by rule so a fresh deployment can be populated without minting a
//! credential first. Seeding is idempotent per call only in the sense that
//! it always inserts fresh records; it does not deduplicate.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::state::{AppState, SensorKind, SensorRecord, SensorStatus};

/// Response reporting how many records were seeded.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SeedResponse {
    /// Number of records inserted.
    pub seeded: usize,
}

/// Build the seed sub-router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/v1/seed/sensors", get(seed_sensors))
}

/// Insert a small set of demo sensors.
#[utoipa::path(
    get,
    path = "/api/v1/seed/sensors",
    tag = "seed",
    responses(
        (status = 200, description = "Demo sensors inserted", body = SeedResponse),
    )
)]
async fn seed_sensors(State(state): State<AppState>) -> Json<SeedResponse> {
    let now = Utc::now();
    let demo = [
        ("Riverside flood gauge", SensorKind::FloodGauge, "riverside", Some(1.42)),
        ("Old Town air monitor", SensorKind::AirQuality, "old-town", Some(37.0)),
        ("Ring road traffic counter", SensorKind::Traffic, "ring-road", None),
    ];

    for (name, kind, district, last_reading) in demo {
        let record = SensorRecord {
            id: Uuid::new_v4(),
            name: name.to_string(),
            kind,
            district: district.to_string(),
            status: SensorStatus::Active,
            last_reading,
            created_at: now,
            updated_at: now,
        };
        state.sensors.insert(record.id, record);
    }

    tracing::info!(count = demo.len(), "demo sensors seeded");
    Json(SeedResponse { seeded: demo.len() })
}
