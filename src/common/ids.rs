// Store identifier parsing for path and payload values

use mongodb::bson::oid::ObjectId;
use tracing::debug;

use super::ApiError;

/// Parses a 24-hex-char identifier. Malformed input is a client error and
/// never reaches the store.
pub fn parse_object_id(raw: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(raw.trim()).map_err(|e| {
        debug!(id = %raw, error = %e, "Rejected malformed identifier");
        ApiError::BadRequest("Invalid id".to_string())
    })
}
