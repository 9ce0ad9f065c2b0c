// In-process DocumentStore used by the router tests

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::Mutex;

use super::{Collection, DeleteSummary, DocumentStore, Record, StoreError, UpdateSummary};

#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<Collection, Vec<Record>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently held in `collection`
    pub async fn count(&self, collection: Collection) -> usize {
        self.collections
            .lock()
            .await
            .get(&collection)
            .map_or(0, Vec::len)
    }
}

fn id_matches(record: &Record, id: &ObjectId) -> bool {
    record.get("_id").and_then(Value::as_str) == Some(id.to_hex().as_str())
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn ensure_connected(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn find(&self, collection: Collection, filter: Record) -> Result<Vec<Record>, StoreError> {
        let collections = self.collections.lock().await;
        let found = collections
            .get(&collection)
            .map(|records| {
                records
                    .iter()
                    .filter(|record| filter.iter().all(|(k, v)| record.get(k) == Some(v)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(found)
    }

    async fn find_by_id(
        &self,
        collection: Collection,
        id: &ObjectId,
    ) -> Result<Option<Record>, StoreError> {
        let collections = self.collections.lock().await;
        Ok(collections
            .get(&collection)
            .and_then(|records| records.iter().find(|r| id_matches(r, id)).cloned()))
    }

    async fn insert(
        &self,
        collection: Collection,
        mut document: Record,
    ) -> Result<ObjectId, StoreError> {
        let id = ObjectId::new();
        document.insert("_id".to_string(), Value::String(id.to_hex()));
        self.collections
            .lock()
            .await
            .entry(collection)
            .or_default()
            .push(document);
        Ok(id)
    }

    async fn update_by_id(
        &self,
        collection: Collection,
        id: &ObjectId,
        changes: Record,
    ) -> Result<UpdateSummary, StoreError> {
        let mut collections = self.collections.lock().await;
        let target = collections
            .get_mut(&collection)
            .and_then(|records| records.iter_mut().find(|r| id_matches(r, id)));

        let (matched, modified) = match target {
            Some(record) => {
                let mut changed = false;
                for (key, value) in changes {
                    if record.get(&key) != Some(&value) {
                        record.insert(key, value);
                        changed = true;
                    }
                }
                (1, u64::from(changed))
            }
            None => (0, 0),
        };

        Ok(UpdateSummary {
            acknowledged: true,
            matched_count: matched,
            modified_count: modified,
            upserted_count: 0,
            upserted_id: None,
        })
    }

    async fn delete_by_id(
        &self,
        collection: Collection,
        id: &ObjectId,
    ) -> Result<DeleteSummary, StoreError> {
        let mut collections = self.collections.lock().await;
        let deleted = match collections.get_mut(&collection) {
            Some(records) => {
                let before = records.len();
                records.retain(|r| !id_matches(r, id));
                (before - records.len()) as u64
            }
            None => 0,
        };
        Ok(DeleteSummary {
            acknowledged: true,
            deleted_count: deleted,
        })
    }
}
