use serde::Serialize;
use serde_json::Value;

use crate::store::Record;

pub const DONATOR_EMAIL: &str = "donator_email";
pub const FOOD_STATUS: &str = "food_status";

/// A stored donation listing. Apart from `_id` and `donator_email` the
/// fields are whatever the donor supplied.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct Food(Record);

impl Food {
    pub fn from_record(record: Record) -> Self {
        Self(record)
    }

    pub fn id(&self) -> Option<&str> {
        self.0.get("_id").and_then(Value::as_str)
    }

    /// The creator's email, the only key that authorizes changes to this food
    pub fn donator_email(&self) -> Option<&str> {
        self.0.get(DONATOR_EMAIL).and_then(Value::as_str)
    }

    pub fn into_record(self) -> Record {
        self.0
    }
}

/// Body of `POST /foods`
#[derive(Debug)]
pub struct NewFood {
    pub body: Record,
}

/// Body of `PATCH /foods/:id`
#[derive(Debug)]
pub struct FoodChanges {
    pub changes: Record,
}
