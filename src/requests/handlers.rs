use super::models::NewRequest;
use super::services::RequestsService;
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

/// GET /requests?status= - List requests
pub async fn list_requests(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<StatusQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let requests_service = RequestsService::new(state.store.clone());

    let requests = requests_service.list_requests(query.status()).await?;

    Ok(Json(requests))
}

/// POST /requests - Request a food
pub async fn create_request(
    Extension(state): Extension<Arc<AppState>>,
    identity: VerifiedIdentity,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let body = json_object(payload)?;
    let requests_service = RequestsService::new(state.store.clone());

    let id = requests_service
        .create_request(NewRequest { body }, &identity)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(InsertedResponse {
            inserted_id: id.to_hex(),
        }),
    ))
}

/// GET /foods/:id/requests - Requests for one food (owner only)
pub async fn list_food_requests(
    Extension(state): Extension<Arc<AppState>>,
    identity: VerifiedIdentity,
    Path(food_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_object_id(&food_id)?;
    let requests_service = RequestsService::new(state.store.clone());

    let requests = requests_service.list_for_owned_food(&id, &identity).await?;

    Ok(Json(requests))
}
