//! In-memory document store
//!
//! Collections are insertion-ordered vectors behind a single `RwLock`.

use crate::query::{matches_all, sort_documents, Condition, FindQuery};
use crate::{document_id, Collection, DocumentStore};
use async_trait::async_trait;
use para_core::{ParaError, Result};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `change` to the document with `id`; false when absent
    async fn modify<F>(&self, collection: Collection, id: &str, change: F) -> Result<bool>
    where
        F: FnOnce(&mut Map<String, Value>) -> Result<()> + Send,
    {
        let mut collections = self.collections.write().await;
        let doc = collections
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|d| d["id"] == id));

        match doc.and_then(Value::as_object_mut) {
            Some(object) => {
                change(object)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

fn merge(target: &mut Map<String, Value>, patch: &Value) -> Result<()> {
    let patch = patch
        .as_object()
        .ok_or_else(|| ParaError::ValidationError("Patch must be a JSON object".to_string()))?;
    for (key, value) in patch {
        if key != "id" {
            target.insert(key.clone(), value.clone());
        }
    }
    Ok(())
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, collection: Collection, doc: Value) -> Result<()> {
        let id = document_id(&doc)?;
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection).or_default();

        if docs.iter().any(|d| d["id"] == id.as_str()) {
            return Err(ParaError::DatabaseError(format!(
                "Duplicate id {id} in {collection}"
            )));
        }
        docs.push(doc);
        Ok(())
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.iter().find(|d| d["id"] == id))
            .cloned())
    }

    async fn find_one(
        &self,
        collection: Collection,
        conditions: &[Condition],
    ) -> Result<Option<Value>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.iter().find(|d| matches_all(d, conditions)))
            .cloned())
    }

    async fn find(&self, collection: Collection, query: &FindQuery) -> Result<Vec<Value>> {
        let mut matched: Vec<Value> = {
            let collections = self.collections.read().await;
            collections
                .get(&collection)
                .map(|docs| {
                    docs.iter()
                        .filter(|d| matches_all(d, &query.conditions))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default()
        };

        sort_documents(&mut matched, &query.sort);
        debug!(%collection, matched = matched.len(), "Memory find");

        Ok(matched
            .into_iter()
            .skip(query.skip)
            .take(query.limit.unwrap_or(usize::MAX))
            .collect())
    }

    async fn count(&self, collection: Collection, conditions: &[Condition]) -> Result<u64> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|docs| docs.iter().filter(|d| matches_all(d, conditions)).count() as u64)
            .unwrap_or(0))
    }

    async fn update(&self, collection: Collection, id: &str, patch: Value) -> Result<bool> {
        self.modify(collection, id, |doc| merge(doc, &patch)).await
    }

    async fn increment(
        &self,
        collection: Collection,
        id: &str,
        field: &'static str,
        by: i64,
    ) -> Result<bool> {
        self.modify(collection, id, |doc| {
            let current = doc.get(field).and_then(Value::as_i64).unwrap_or(0);
            doc.insert(field.to_string(), Value::from(current + by));
            Ok(())
        })
        .await
    }

    async fn push(
        &self,
        collection: Collection,
        id: &str,
        field: &'static str,
        value: Value,
    ) -> Result<bool> {
        self.modify(collection, id, |doc| {
            match doc.get_mut(field) {
                Some(Value::Array(items)) => items.push(value),
                _ => {
                    doc.insert(field.to_string(), Value::Array(vec![value]));
                }
            }
            Ok(())
        })
        .await
    }

    async fn update_where(
        &self,
        collection: Collection,
        conditions: &[Condition],
        patch: Value,
    ) -> Result<u64> {
        let mut collections = self.collections.write().await;
        let mut changed = 0;
        if let Some(docs) = collections.get_mut(&collection) {
            for doc in docs.iter_mut().filter(|d| matches_all(d, conditions)) {
                if let Some(object) = doc.as_object_mut() {
                    merge(object, &patch)?;
                    changed += 1;
                }
            }
        }
        Ok(changed)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
