use mongodb::bson::oid::ObjectId;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use super::models::{Food, FoodChanges, NewFood, DONATOR_EMAIL, FOOD_STATUS};
use super::ownership::authorize_owner;
use crate::auth::VerifiedIdentity;
use crate::common::{safe_email_log, ApiError, Validator};
use crate::requests::RequestsService;
use crate::store::{filter_eq, Collection, DeleteSummary, DocumentStore, Record, UpdateSummary};

pub struct FoodsService {
    store: Arc<dyn DocumentStore>,
}

impl FoodsService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// List foods, optionally only those whose `food_status` equals `status`
    pub async fn list_foods(&self, status: Option<&str>) -> Result<Vec<Record>, ApiError> {
        let filter = match status {
            Some(status) => filter_eq(FOOD_STATUS, status),
            None => Record::new(),
        };
        Ok(self.store.find(Collection::Foods, filter).await?)
    }

    /// Get food by ID, `NotFound` when absent
    pub async fn get_food(&self, id: &ObjectId) -> Result<Food, ApiError> {
        self.store
            .find_by_id(Collection::Foods, id)
            .await?
            .map(Food::from_record)
            .ok_or_else(|| ApiError::NotFound("Food not found".to_string()))
    }

    /// The food with every request made against it under `requests`
    pub async fn get_food_with_requests(&self, id: &ObjectId) -> Result<Record, ApiError> {
        let food = self.get_food(id).await?;
        let requests = RequestsService::new(self.store.clone())
            .list_for_food(id)
            .await?;

        let requests = requests.into_iter().map(Value::Object).collect();
        let mut record = food.into_record();
        record.insert("requests".to_string(), Value::Array(requests));
        Ok(record)
    }

    /// Looks the food up and applies the ownership policy for `caller`
    pub async fn get_owned_food(
        &self,
        id: &ObjectId,
        caller: &VerifiedIdentity,
    ) -> Result<Food, ApiError> {
        let food = self.get_food(id).await?;
        authorize_owner(&food, caller)?;
        Ok(food)
    }

    /// Create a new food, owned by `caller` unless the payload names a donator
    pub async fn create_food(
        &self,
        request: NewFood,
        caller: &VerifiedIdentity,
    ) -> Result<ObjectId, ApiError> {
        let validation_result = request.validate();
        if !validation_result.is_valid {
            return Err(ApiError::from(validation_result));
        }

        let mut body = request.body;
        body.remove("_id");
        let missing_donator = matches!(body.get(DONATOR_EMAIL), None | Some(Value::Null));
        if missing_donator {
            body.insert(DONATOR_EMAIL.to_string(), Value::String(caller.email.clone()));
        }

        let id = self.store.insert(Collection::Foods, body).await?;
        info!(
            food_id = %id,
            donor = %safe_email_log(&caller.email),
            "Created food"
        );
        Ok(id)
    }

    /// Partial update of a food owned by `caller`
    pub async fn update_food(
        &self,
        id: &ObjectId,
        request: FoodChanges,
        caller: &VerifiedIdentity,
    ) -> Result<UpdateSummary, ApiError> {
        self.get_owned_food(id, caller).await?;

        let validation_result = request.validate();
        if !validation_result.is_valid {
            return Err(ApiError::from(validation_result));
        }

        let summary = self
            .store
            .update_by_id(Collection::Foods, id, request.changes)
            .await?;
        info!(food_id = %id, modified = summary.modified_count, "Updated food");
        Ok(summary)
    }

    /// Delete a food owned by `caller`. Its requests are left in place.
    pub async fn delete_food(
        &self,
        id: &ObjectId,
        caller: &VerifiedIdentity,
    ) -> Result<DeleteSummary, ApiError> {
        self.get_owned_food(id, caller).await?;

        let summary = self.store.delete_by_id(Collection::Foods, id).await?;
        info!(food_id = %id, deleted = summary.deleted_count, "Deleted food");
        Ok(summary)
    }
}
