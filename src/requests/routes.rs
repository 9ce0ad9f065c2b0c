use super::handlers;
use axum::{routing::get, Router};

/// Creates the requests router
///
/// # Routes
/// - `GET /requests` - List requests (public, `?status=` filter)
/// - `POST /requests` - Request a food (authenticated)
/// - `GET /foods/:id/requests` - Requests for a food (owner)
pub fn requests_routes() -> Router {
    Router::new()
        .route(
            "/requests",
            get(handlers::list_requests).post(handlers::create_request),
        )
        .route("/foods/:id/requests", get(handlers::list_food_requests))
}
