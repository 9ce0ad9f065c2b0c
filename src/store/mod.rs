//! # Store Module
//!
//! The document store port and its adapters:
//! - `DocumentStore` trait over the `foods` and `requests` collections
//! - `MongoStore`, backed by the MongoDB driver's connection pool
//! - `MemoryStore`, an in-process stand-in used by the router tests

pub mod mongo;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

pub use mongo::MongoStore;

/// A schema-less document as exchanged with handlers. `_id` is a hex string.
pub type Record = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Foods,
    Requests,
}

impl Collection {
    pub fn name(self) -> &'static str {
        match self {
            Collection::Foods => "foods",
            Collection::Requests => "requests",
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("document encoding error: {0}")]
    Encoding(String),

    #[error("store did not return an object id for the inserted document")]
    MissingInsertedId,
}

/// Result of a single-document update, shaped like the driver's own summary
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSummary {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
    pub upserted_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSummary {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

/// Data persistence contract for the two collections.
///
/// Every method is a single round trip; filters are field equality only.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Idempotent connectivity check. Safe to call any number of times.
    async fn ensure_connected(&self) -> Result<(), StoreError>;

    async fn find(&self, collection: Collection, filter: Record) -> Result<Vec<Record>, StoreError>;

    async fn find_by_id(
        &self,
        collection: Collection,
        id: &ObjectId,
    ) -> Result<Option<Record>, StoreError>;

    /// Inserts `document` and returns the store-assigned id. Any `_id` in the
    /// document is discarded.
    async fn insert(&self, collection: Collection, document: Record)
        -> Result<ObjectId, StoreError>;

    /// Applies `changes` with `$set` semantics
    async fn update_by_id(
        &self,
        collection: Collection,
        id: &ObjectId,
        changes: Record,
    ) -> Result<UpdateSummary, StoreError>;

    async fn delete_by_id(
        &self,
        collection: Collection,
        id: &ObjectId,
    ) -> Result<DeleteSummary, StoreError>;
}

/// Builds a one-field equality filter
pub fn filter_eq(field: &str, value: impl Into<Value>) -> Record {
    let mut filter = Record::new();
    filter.insert(field.to_string(), value.into());
    filter
}
