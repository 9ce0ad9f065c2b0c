// Common module - shared types and utilities across all modules

pub mod config;
pub mod error;
pub mod helpers;
pub mod ids;
pub mod models;
pub mod state;
pub mod validation;

// Re-export commonly used types for convenience
pub use config::Config;
pub use error::ApiError;
pub use helpers::{safe_email_log, safe_token_log};
pub use ids::parse_object_id;
pub use models::{InsertedResponse, StatusQuery};
pub use state::AppState;
pub use validation::{json_object, ValidationResult, Validator};
