use super::models::{FoodChanges, NewFood};
use super::services::FoodsService;
use crate::auth::VerifiedIdentity;
use crate::common::{
    json_object, parse_object_id, ApiError, AppState, InsertedResponse, StatusQuery,
};
use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::Value;
use std::sync::Arc;

// ============================================================================
// Public Handlers
// ============================================================================

/// GET /foods?status= - List foods
pub async fn list_foods(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<StatusQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let foods_service = FoodsService::new(state.store.clone());

    let foods = foods_service.list_foods(query.status()).await?;

    Ok(Json(foods))
}

/// GET /foods/:id - Get one food with its requests embedded
pub async fn get_food(
    Extension(state): Extension<Arc<AppState>>,
    Path(food_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_object_id(&food_id)?;
    let foods_service = FoodsService::new(state.store.clone());

    let food = foods_service.get_food_with_requests(&id).await?;

    Ok(Json(food))
}

// ============================================================================
// Authenticated Handlers
// ============================================================================

/// POST /foods - Create a food
pub async fn create_food(
    Extension(state): Extension<Arc<AppState>>,
    identity: VerifiedIdentity,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let body = json_object(payload)?;
    let foods_service = FoodsService::new(state.store.clone());

    let id = foods_service
        .create_food(NewFood { body }, &identity)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(InsertedResponse {
            inserted_id: id.to_hex(),
        }),
    ))
}

/// PATCH /foods/:id - Update a food (owner only)
pub async fn update_food(
    Extension(state): Extension<Arc<AppState>>,
    identity: VerifiedIdentity,
    Path(food_id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_object_id(&food_id)?;
    let changes = json_object(payload)?;
    let foods_service = FoodsService::new(state.store.clone());

    let summary = foods_service
        .update_food(&id, FoodChanges { changes }, &identity)
        .await?;

    Ok(Json(summary))
}

/// DELETE /foods/:id - Delete a food (owner only)
pub async fn delete_food(
    Extension(state): Extension<Arc<AppState>>,
    identity: VerifiedIdentity,
    Path(food_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_object_id(&food_id)?;
    let foods_service = FoodsService::new(state.store.clone());

    let summary = foods_service.delete_food(&id, &identity).await?;

    Ok(Json(summary))
}
