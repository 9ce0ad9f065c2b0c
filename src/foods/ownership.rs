//! Resource ownership policy
//!
//! Only the donor who created a food may update it, delete it, or list the
//! requests made against it. Callers look the food up first (absent is
//! `NotFound`), then ask this predicate before touching anything.

use tracing::warn;

use super::models::Food;
use crate::auth::VerifiedIdentity;
use crate::common::{safe_email_log, ApiError};

pub fn authorize_owner(food: &Food, caller: &VerifiedIdentity) -> Result<(), ApiError> {
    match food.donator_email() {
        Some(owner) if owner == caller.email => Ok(()),
        owner => {
            warn!(
                food_id = food.id().unwrap_or_default(),
                owner = %owner.map(safe_email_log).unwrap_or_default(),
                caller = %safe_email_log(&caller.email),
                "Ownership check failed"
            );
            Err(ApiError::Forbidden("Forbidden access".to_string()))
        }
    }
}
