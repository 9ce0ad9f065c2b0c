// src/store/mongo.rs
//! MongoDB adapter for the `DocumentStore` port

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{self, doc, oid::ObjectId, Bson, Document},
    options::ClientOptions,
    Client, Collection as MongoCollection, Database,
};
use serde_json::Value;
use tracing::{debug, info};

use super::{Collection, DeleteSummary, DocumentStore, Record, StoreError, UpdateSummary};

const APP_NAME: &str = "food-share-api";

/// Holds the driver's pooled client and the two collection handles.
///
/// The driver connects lazily and re-establishes connections per operation,
/// so a store that fails at startup recovers on a later request without any
/// flag of our own.
pub struct MongoStore {
    db: Database,
    foods: MongoCollection<Document>,
    requests: MongoCollection<Document>,
}

impl MongoStore {
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self, StoreError> {
        let mut options = ClientOptions::parse(uri).await?;
        options.app_name.get_or_insert_with(|| APP_NAME.to_string());

        let client = Client::with_options(options)?;
        let db = client.database(db_name);
        info!(database = %db_name, "MongoDB client initialized");

        Ok(Self {
            foods: db.collection(Collection::Foods.name()),
            requests: db.collection(Collection::Requests.name()),
            db,
        })
    }

    fn collection(&self, collection: Collection) -> &MongoCollection<Document> {
        match collection {
            Collection::Foods => &self.foods,
            Collection::Requests => &self.requests,
        }
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn ensure_connected(&self) -> Result<(), StoreError> {
        self.db.run_command(doc! { "ping": 1 }, None).await?;
        debug!("MongoDB ping succeeded");
        Ok(())
    }

    async fn find(&self, collection: Collection, filter: Record) -> Result<Vec<Record>, StoreError> {
        let cursor = self
            .collection(collection)
            .find(to_document(filter)?, None)
            .await?;
        let documents: Vec<Document> = cursor.try_collect().await?;
        Ok(documents.into_iter().map(to_record).collect())
    }

    async fn find_by_id(
        &self,
        collection: Collection,
        id: &ObjectId,
    ) -> Result<Option<Record>, StoreError> {
        let found = self
            .collection(collection)
            .find_one(doc! { "_id": *id }, None)
            .await?;
        Ok(found.map(to_record))
    }

    async fn insert(
        &self,
        collection: Collection,
        mut document: Record,
    ) -> Result<ObjectId, StoreError> {
        document.remove("_id");
        let result = self
            .collection(collection)
            .insert_one(to_document(document)?, None)
            .await?;
        result
            .inserted_id
            .as_object_id()
            .ok_or(StoreError::MissingInsertedId)
    }

    async fn update_by_id(
        &self,
        collection: Collection,
        id: &ObjectId,
        changes: Record,
    ) -> Result<UpdateSummary, StoreError> {
        let result = self
            .collection(collection)
            .update_one(
                doc! { "_id": *id },
                doc! { "$set": to_document(changes)? },
                None,
            )
            .await?;

        let upserted_id = result
            .upserted_id
            .as_ref()
            .and_then(Bson::as_object_id)
            .map(|oid| oid.to_hex());

        Ok(UpdateSummary {
            acknowledged: true,
            matched_count: result.matched_count,
            modified_count: result.modified_count,
            upserted_count: u64::from(upserted_id.is_some()),
            upserted_id,
        })
    }

    async fn delete_by_id(
        &self,
        collection: Collection,
        id: &ObjectId,
    ) -> Result<DeleteSummary, StoreError> {
        let result = self
            .collection(collection)
            .delete_one(doc! { "_id": *id }, None)
            .await?;
        Ok(DeleteSummary {
            acknowledged: true,
            deleted_count: result.deleted_count,
        })
    }
}

fn to_document(record: Record) -> Result<Document, StoreError> {
    bson::to_document(&record).map_err(|e| StoreError::Encoding(e.to_string()))
}

/// Flattens a BSON document into plain JSON with `_id` as a hex string
fn to_record(mut document: Document) -> Record {
    if let Ok(id) = document.get_object_id("_id") {
        document.insert("_id", id.to_hex());
    }
    match Bson::Document(document).into_relaxed_extjson() {
        Value::Object(map) => map,
        _ => Record::new(),
    }
}
