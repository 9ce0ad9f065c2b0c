// Presence checks for incoming JSON payloads

use axum::{extract::rejection::JsonRejection, Json};
use serde_json::{Map, Value};
use tracing::debug;

use super::ApiError;

#[derive(Debug)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

#[derive(Debug)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    pub fn add_error(&mut self, field: &str, message: &str) {
        self.is_valid = false;
        self.errors.push(ValidationError {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    /// Converts into `Ok(())` or the collected errors
    pub fn into_result(self) -> Result<(), ValidationResult> {
        if self.is_valid {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Implemented by payload wrappers that can check themselves before a write
pub trait Validator {
    fn validate(&self) -> ValidationResult;
}

/// Unwraps a JSON body that must be an object, mapping every failure to a
/// `{ message }` 400 instead of axum's plain-text rejection
pub fn json_object(
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Map<String, Value>, ApiError> {
    match payload {
        Ok(Json(Value::Object(map))) => Ok(map),
        Ok(Json(_)) => Err(ApiError::BadRequest(
            "Request body must be a JSON object".to_string(),
        )),
        Err(rejection) => {
            debug!(error = %rejection, "Rejected request body");
            Err(ApiError::BadRequest(rejection.body_text()))
        }
    }
}

/// Requires `field` to be present and hold a non-empty string
pub fn require_string(body: &Map<String, Value>, field: &str, result: &mut ValidationResult) {
    match body.get(field) {
        None | Some(Value::Null) => result.add_error(field, "is required"),
        Some(Value::String(s)) if s.trim().is_empty() => {
            result.add_error(field, "must not be empty")
        }
        Some(Value::String(_)) => {}
        Some(_) => result.add_error(field, "must be a string"),
    }
}

/// Allows `field` to be absent, but if present it must be a string
pub fn optional_string(body: &Map<String, Value>, field: &str, result: &mut ValidationResult) {
    match body.get(field) {
        None | Some(Value::Null) | Some(Value::String(_)) => {}
        Some(_) => result.add_error(field, "must be a string"),
    }
}
