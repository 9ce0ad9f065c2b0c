use mongodb::bson::oid::ObjectId;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use super::models::{NewRequest, RequestStamp, FOOD_ID, STATUS};
use crate::auth::VerifiedIdentity;
use crate::common::{parse_object_id, safe_email_log, ApiError, Validator};
use crate::foods::FoodsService;
use crate::store::{filter_eq, Collection, DocumentStore, Record};

pub struct RequestsService {
    store: Arc<dyn DocumentStore>,
}

impl RequestsService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// List requests, optionally only those whose `status` equals `status`
    pub async fn list_requests(&self, status: Option<&str>) -> Result<Vec<Record>, ApiError> {
        let filter = match status {
            Some(status) => filter_eq(STATUS, status),
            None => Record::new(),
        };
        Ok(self.store.find(Collection::Requests, filter).await?)
    }

    /// Every request whose `food_id` is this food's id
    pub async fn list_for_food(&self, food_id: &ObjectId) -> Result<Vec<Record>, ApiError> {
        Ok(self
            .store
            .find(Collection::Requests, filter_eq(FOOD_ID, food_id.to_hex()))
            .await?)
    }

    /// Requests for a food, disclosed only to the food's donor
    pub async fn list_for_owned_food(
        &self,
        food_id: &ObjectId,
        caller: &VerifiedIdentity,
    ) -> Result<Vec<Record>, ApiError> {
        FoodsService::new(self.store.clone())
            .get_owned_food(food_id, caller)
            .await?;
        self.list_for_food(food_id).await
    }

    /// Create a pending request against an existing food
    pub async fn create_request(
        &self,
        request: NewRequest,
        caller: &VerifiedIdentity,
    ) -> Result<ObjectId, ApiError> {
        request.validate().into_result()?;

        let mut body = request.body;
        let food_id = match body.get(FOOD_ID).and_then(Value::as_str) {
            Some(raw) => parse_object_id(raw)?,
            None => return Err(ApiError::BadRequest("food_id: is required".to_string())),
        };

        // The linkage is only ever checked here, at write time
        FoodsService::new(self.store.clone())
            .get_food(&food_id)
            .await?;

        RequestStamp::new(food_id, caller.clone()).apply(&mut body);

        let id = self.store.insert(Collection::Requests, body).await?;
        info!(
            request_id = %id,
            food_id = %food_id,
            requester = %safe_email_log(&caller.email),
            "Created request"
        );
        Ok(id)
    }
}
