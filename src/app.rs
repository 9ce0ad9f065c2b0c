// src/app.rs
//! Router composition

use axum::{
    extract::Extension,
    http::{header, HeaderValue, Method},
    middleware,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::common::AppState;
use crate::{foods, logging_middleware, requests};

/// GET / - Liveness
async fn root() -> Json<Value> {
    Json(json!({
        "ok": true,
        "message": "Food sharing server is running",
    }))
}

/// Builds the full application router around `state`.
///
/// `cors_origins` of `None` allows any origin.
pub fn build_router(state: AppState, cors_origins: Option<&[String]>) -> Router {
    Router::new()
        .route("/", get(root))
        // ====================================================================
        // FOOD ROUTES
        // ====================================================================
        .merge(foods::foods_routes())
        // ====================================================================
        // REQUEST ROUTES
        // ====================================================================
        .merge(requests::requests_routes())
        // ====================================================================
        // MIDDLEWARE AND LAYERS
        // ====================================================================
        .layer(middleware::from_fn(logging_middleware::log_request_response))
        .layer(Extension(Arc::new(state)))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: Option<&[String]>) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ];

    match origins {
        Some(origins) => {
            let allowed: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match origin.parse() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        warn!(origin = %origin, "Ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();

            CorsLayer::new()
                .allow_origin(allowed)
                .allow_methods(methods)
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
                .allow_credentials(true)
        }
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any),
    }
}
