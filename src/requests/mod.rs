//! # Requests Module
//!
//! Claims made against food listings:
//! - Creation by an authenticated requester, with server-stamped identity fields
//! - Public listing (optionally by status)
//! - Owner-only listing of the requests for one food

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod validators;


pub use routes::requests_routes;
pub use services::RequestsService;
