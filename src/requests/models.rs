use chrono::{SecondsFormat, Utc};
use mongodb::bson::oid::ObjectId;
use serde_json::Value;

use crate::auth::VerifiedIdentity;
use crate::store::Record;

pub const FOOD_ID: &str = "food_id";
pub const STATUS: &str = "status";
pub const PENDING: &str = "pending";

/// Body of `POST /requests`
#[derive(Debug)]
pub struct NewRequest {
    pub body: Record,
}

/// Server-assigned fields of a new request. These always overwrite whatever
/// the caller sent under the same names.
#[derive(Debug, Clone)]
pub struct RequestStamp {
    pub food_id: ObjectId,
    pub requester: VerifiedIdentity,
    pub created_at: String,
}

impl RequestStamp {
    pub fn new(food_id: ObjectId, requester: VerifiedIdentity) -> Self {
        Self {
            food_id,
            requester,
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    pub fn apply(self, body: &mut Record) {
        body.remove("_id");
        body.insert(FOOD_ID.to_string(), Value::String(self.food_id.to_hex()));
        body.insert(
            "requester_email".to_string(),
            Value::String(self.requester.email),
        );
        body.insert(
            "requester_name".to_string(),
            self.requester.name.map_or(Value::Null, Value::String),
        );
        body.insert(
            "requester_photo".to_string(),
            self.requester.photo.map_or(Value::Null, Value::String),
        );
        body.insert(STATUS.to_string(), Value::String(PENDING.to_string()));
        body.insert("created_at".to_string(), Value::String(self.created_at));
    }
}
