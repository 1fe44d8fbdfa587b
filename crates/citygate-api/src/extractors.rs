//! # Request Body Extraction & Validation
//!
//! Handlers take their JSON bodies as `Result<Json<T>, JsonRejection>` and
//! run them through [`extract_validated_json`], which turns axum's
//! deserialization rejections into 400s and business-rule violations into
//! 422s, keeping both on the [`AppError`] response shape.

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::error::AppError;

/// Business-rule validation beyond what serde checks structurally.
pub trait Validate {
    /// Validate business rules. Returns an error message on failure.
    fn validate(&self) -> Result<(), String>;
}

/// Unwrap a JSON body, mapping deserialization failures to [`AppError::BadRequest`].
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(value)| value)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

/// Unwrap a JSON body and run its [`Validate`] rules.
pub fn extract_validated_json<T: Validate>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let value = extract_json(result)?;
    value.validate().map_err(AppError::Validation)?;
    Ok(value)
}
