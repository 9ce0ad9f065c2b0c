use super::models::{FoodChanges, NewFood, DONATOR_EMAIL};
use crate::common::validation::optional_string;
use crate::common::{ValidationResult, Validator};

/// Fields a PATCH may never touch
pub const IMMUTABLE_FIELDS: [&str; 2] = ["_id", DONATOR_EMAIL];

impl Validator for NewFood {
    fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();
        optional_string(&self.body, DONATOR_EMAIL, &mut result);
        result
    }
}

impl Validator for FoodChanges {
    fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();

        for field in IMMUTABLE_FIELDS {
            if self.changes.contains_key(field) {
                result.add_error(field, "cannot be updated");
            }
        }

        if self.changes.is_empty() {
            result.add_error("body", "at least one field is required");
        }

        result
    }
}
