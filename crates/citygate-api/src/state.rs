//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers via
//! the `State` extractor. Holds the immutable [`AuthGate`] plus the
//! in-memory stores backing the civic sensing collaborator routes.
//!
//! The gate configuration (verification key, rule list) is assembled here
//! once at startup. A missing or unusable key is a construction error, not
//! a per-request condition: the service refuses to start rather than serve
//! requests it cannot evaluate.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use citygate_core::{PatternError, TokenVerifier};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{default_rules, AuthGate};

// -- Generic In-Memory Store --------------------------------------------------

/// Thread-safe, cloneable in-memory key-value store.
///
/// All operations are synchronous (the RwLock is `parking_lot`, not
/// `tokio::sync`) because the lock is never held across `.await` points.
#[derive(Debug)]
pub struct Store<T: Clone + Send + Sync> {
    data: Arc<RwLock<HashMap<Uuid, T>>>,
}

impl<T: Clone + Send + Sync> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<T: Clone + Send + Sync> Store<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a record, returning the previous value if the key existed.
    pub fn insert(&self, id: Uuid, value: T) -> Option<T> {
        self.data.write().insert(id, value)
    }

    /// Retrieve a record by ID.
    pub fn get(&self, id: &Uuid) -> Option<T> {
        self.data.read().get(id).cloned()
    }

    /// List all records.
    pub fn list(&self) -> Vec<T> {
        self.data.read().values().cloned().collect()
    }

    /// Update a record in place. Returns the updated record, or `None` if not found.
    pub fn update(&self, id: &Uuid, f: impl FnOnce(&mut T)) -> Option<T> {
        let mut guard = self.data.write();
        if let Some(entry) = guard.get_mut(id) {
            f(entry);
            Some(entry.clone())
        } else {
            None
        }
    }

    /// Return the number of records.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone + Send + Sync> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

// -- Civic Sensing Record Types -----------------------------------------------

/// Kind of city sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    /// Particulate / gas monitoring station.
    AirQuality,
    /// Waterway level gauge.
    FloodGauge,
    /// Road traffic counter.
    Traffic,
    /// Weather station.
    Weather,
}

/// Operational status of a sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SensorStatus {
    /// Reporting normally.
    Active,
    /// Reporting, but readings are suspect.
    Degraded,
    /// Not reporting.
    Offline,
}

/// City sensor record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SensorRecord {
    /// Unique identifier.
    pub id: Uuid,
    /// Human-readable name.
    pub name: String,
    /// Sensor kind.
    pub kind: SensorKind,
    /// District the sensor is installed in.
    pub district: String,
    /// Operational status.
    pub status: SensorStatus,
    /// Most recent reading, unit depends on kind.
    pub last_reading: Option<f64>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Severity of a reported incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncidentSeverity {
    /// No immediate risk.
    Minor,
    /// Response needed.
    Major,
    /// Life or infrastructure at risk.
    Critical,
}

/// Lifecycle status of an incident report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncidentStatus {
    /// Filed, awaiting triage.
    Reported,
    /// A responder has been assigned.
    Assigned,
    /// Closed out.
    Resolved,
}

/// Incident report record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IncidentRecord {
    /// Unique identifier.
    pub id: Uuid,
    /// Short summary.
    pub title: String,
    /// Full description.
    pub description: String,
    /// Severity classification.
    pub severity: IncidentSeverity,
    /// Lifecycle status.
    pub status: IncidentStatus,
    /// Subject id of the reporting caller, taken from the identity context.
    pub reported_by: String,
    /// Subject id of the assigned responder, once triaged.
    pub assigned_to: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

// -- Application State --------------------------------------------------------

/// Application configuration.
///
/// Custom `Debug` redacts the verification secret to prevent credential
/// leakage in logs.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Shared HS256 key for verifying issuer-signed credentials.
    /// Construction fails when absent — there is no auth-disabled mode.
    pub jwt_secret: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            jwt_secret: None,
        }
    }
}

/// Error constructing the application state.
///
/// These are startup-fatal: the process must refuse to serve rather than
/// evaluate requests without a usable verification key or rule list.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No verification key supplied.
    #[error("CITYGATE_JWT_SECRET is not set — the gate cannot verify credentials")]
    MissingJwtSecret,
    /// The verification key is empty.
    #[error("CITYGATE_JWT_SECRET is empty")]
    EmptyJwtSecret,
    /// A configured rule pattern failed to parse.
    #[error("invalid access rule pattern: {0}")]
    InvalidRule(#[from] PatternError),
}

/// Shared application state accessible to all route handlers.
///
/// Clone-friendly via `Arc` internals in each `Store` and in the gate.
#[derive(Debug, Clone)]
pub struct AppState {
    /// City sensor registry.
    pub sensors: Store<SensorRecord>,
    /// Incident reports.
    pub incidents: Store<IncidentRecord>,
    /// The authentication/authorization gate.
    pub gate: AuthGate,
    /// Configuration.
    pub config: AppConfig,
}

impl AppState {
    /// Create the application state, returning `Err` when the gate cannot
    /// be configured.
    pub fn try_with_config(config: AppConfig) -> Result<Self, ConfigError> {
        let secret = config
            .jwt_secret
            .as_deref()
            .ok_or(ConfigError::MissingJwtSecret)?;
        if secret.is_empty() {
            return Err(ConfigError::EmptyJwtSecret);
        }

        let gate = AuthGate::new(TokenVerifier::new(secret.as_bytes()), default_rules()?);

        Ok(Self {
            sensors: Store::new(),
            incidents: Store::new(),
            gate,
            config,
        })
    }

    /// Convenience constructor from a secret, using defaults otherwise.
    ///
    /// # Panics
    ///
    /// Panics if `secret` is empty. Prefer [`AppState::try_with_config`]
    /// for graceful error handling in production paths.
    pub fn with_secret(secret: &str) -> Self {
        Self::try_with_config(AppConfig {
            jwt_secret: Some(secret.to_string()),
            ..AppConfig::default()
        })
        .expect("state construction from non-empty secret")
    }
}
