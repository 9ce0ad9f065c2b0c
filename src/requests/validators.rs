use super::models::{NewRequest, FOOD_ID};
use crate::common::validation::require_string;
use crate::common::{ValidationResult, Validator};

impl Validator for NewRequest {
    fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();
        require_string(&self.body, FOOD_ID, &mut result);
        result
    }
}
