//! Para Store - Document store abstraction
//!
//! Records are persisted as JSON documents keyed by their `id` field. The
//! [`DocumentStore`] trait is implemented by an in-memory backend (tests,
//! local development) and a SurrealDB backend (production). [`Records`]
//! layers typed access on top.
//!
//! Author: hephaex@gmail.com

pub mod memory;
pub mod query;
pub mod records;
pub mod surreal;

pub use memory::MemoryStore;
pub use query::{Condition, Direction, FindQuery, Sort};
pub use records::Records;
pub use surreal::SurrealStore;

use async_trait::async_trait;
use para_core::{DatabaseConfig, Result, StoreBackend};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// Named document collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Sightings,
    HauntingReports,
    Investigators,
    InvestigatorReviews,
    Bookings,
    EquipmentReviews,
    Subscriptions,
    Donations,
    VideoAds,
    AiReports,
}

impl Collection {
    pub const ALL: [Collection; 10] = [
        Self::Sightings,
        Self::HauntingReports,
        Self::Investigators,
        Self::InvestigatorReviews,
        Self::Bookings,
        Self::EquipmentReviews,
        Self::Subscriptions,
        Self::Donations,
        Self::VideoAds,
        Self::AiReports,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sightings => "sightings",
            Self::HauntingReports => "haunting_reports",
            Self::Investigators => "investigators",
            Self::InvestigatorReviews => "investigator_reviews",
            Self::Bookings => "bookings",
            Self::EquipmentReviews => "equipment_reviews",
            Self::Subscriptions => "subscriptions",
            Self::Donations => "donations",
            Self::VideoAds => "video_ads",
            Self::AiReports => "ai_reports",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait for document store backends
///
/// Every write touches a single document; there are no multi-document
/// transactions.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Store a new document. It must be a JSON object with a string `id`.
    async fn insert(&self, collection: Collection, doc: Value) -> Result<()>;

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>>;

    /// First matching document in insertion order
    async fn find_one(
        &self,
        collection: Collection,
        conditions: &[Condition],
    ) -> Result<Option<Value>>;

    async fn find(&self, collection: Collection, query: &FindQuery) -> Result<Vec<Value>>;

    async fn count(&self, collection: Collection, conditions: &[Condition]) -> Result<u64>;

    /// Merge the top-level fields of `patch` into the document.
    /// Returns false when no document has that id.
    async fn update(&self, collection: Collection, id: &str, patch: Value) -> Result<bool>;

    /// Add `by` to a numeric field, treating a missing field as zero
    async fn increment(
        &self,
        collection: Collection,
        id: &str,
        field: &'static str,
        by: i64,
    ) -> Result<bool>;

    /// Append `value` to an array field, creating the array if missing
    async fn push(
        &self,
        collection: Collection,
        id: &str,
        field: &'static str,
        value: Value,
    ) -> Result<bool>;

    /// Merge `patch` into every matching document, returning how many changed
    async fn update_where(
        &self,
        collection: Collection,
        conditions: &[Condition],
        patch: Value,
    ) -> Result<u64>;

    /// Backend liveness check
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str;
}

/// Build the configured store backend
pub async fn create_store(config: &DatabaseConfig) -> Result<Arc<dyn DocumentStore>> {
    match config.backend {
        StoreBackend::Memory => {
            info!("Using in-memory document store");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::SurrealDb => {
            info!("Connecting to SurrealDB at {}", config.surrealdb_url);
            let store = SurrealStore::connect(config).await?;
            store.init_schema().await?;
            Ok(Arc::new(store))
        }
    }
}

/// Pull the `id` out of a document, rejecting anything that is not an
/// object with a string id.
pub(crate) fn document_id(doc: &Value) -> Result<String> {
    doc.get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            para_core::ParaError::ValidationError("Document must have a string id".to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collection_names_unique() {
        let mut names: Vec<&str> = Collection::ALL.iter().map(|c| c.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), Collection::ALL.len());
        assert_eq!(Collection::VideoAds.to_string(), "video_ads");
    }

    #[test]
    fn test_document_id() {
        assert_eq!(document_id(&json!({"id": "abc"})).unwrap(), "abc");
        assert!(document_id(&json!({"id": 7})).is_err());
        assert!(document_id(&json!([1, 2])).is_err());
    }

    #[tokio::test]
    async fn test_create_memory_store() {
        let config = DatabaseConfig {
            backend: StoreBackend::Memory,
            ..DatabaseConfig::default()
        };
        let store = create_store(&config).await.unwrap();
        assert_eq!(store.backend_name(), "memory");
        store.ping().await.unwrap();
    }
}
