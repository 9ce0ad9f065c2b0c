use super::handlers;
use axum::{routing::get, Router};

/// Creates the foods router
///
/// # Routes
/// - `GET /foods` - List foods (public, `?status=` filter)
/// - `POST /foods` - Create a food (authenticated)
/// - `GET /foods/:id` - Food detail with its requests (public)
/// - `PATCH /foods/:id` - Update a food (owner)
/// - `DELETE /foods/:id` - Delete a food (owner)
pub fn foods_routes() -> Router {
    Router::new()
        .route(
            "/foods",
            get(handlers::list_foods).post(handlers::create_food),
        )
        .route(
            "/foods/:id",
            get(handlers::get_food)
                .patch(handlers::update_food)
                .delete(handlers::delete_food),
        )
}
