//! # Foods Module
//!
//! Donation listings:
//! - Public listing (optionally by status) and detail with embedded requests
//! - Creation by an authenticated donor
//! - Owner-only update and delete, gated by the ownership policy

pub mod handlers;
pub mod models;
pub mod ownership;
pub mod routes;
pub mod services;
pub mod validators;


pub use ownership::authorize_owner;
pub use routes::foods_routes;
pub use services::FoodsService;
