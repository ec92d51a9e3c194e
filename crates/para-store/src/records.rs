//! Typed access over a [`DocumentStore`]

use crate::query::{Condition, FindQuery};
use crate::{Collection, DocumentStore};
use para_core::{ParaError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Serializes records into documents and back
#[derive(Clone)]
pub struct Records {
    store: Arc<dyn DocumentStore>,
}

impl Records {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// The untyped store, for partial updates and counters
    pub fn raw(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    pub async fn insert<T: Serialize + Sync>(&self, collection: Collection, record: &T) -> Result<()> {
        let doc = serde_json::to_value(record)?;
        self.store.insert(collection, doc).await
    }

    pub async fn get<T: DeserializeOwned>(&self, collection: Collection, id: &str) -> Result<Option<T>> {
        match self.store.get(collection, id).await? {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    /// Like [`Records::get`], but a missing record is `NotFound(what)`
    pub async fn require<T: DeserializeOwned>(
        &self,
        collection: Collection,
        id: &str,
        what: &str,
    ) -> Result<T> {
        self.get(collection, id)
            .await?
            .ok_or_else(|| ParaError::NotFound(what.to_string()))
    }

    pub async fn find<T: DeserializeOwned>(
        &self,
        collection: Collection,
        query: &FindQuery,
    ) -> Result<Vec<T>> {
        self.store
            .find(collection, query)
            .await?
            .into_iter()
            .map(|doc| serde_json::from_value(doc).map_err(ParaError::from))
            .collect()
    }

    pub async fn find_one<T: DeserializeOwned>(
        &self,
        collection: Collection,
        conditions: &[Condition],
    ) -> Result<Option<T>> {
        match self.store.find_one(collection, conditions).await? {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn count(&self, collection: Collection, conditions: &[Condition]) -> Result<u64> {
        self.store.count(collection, conditions).await
    }
}

impl std::fmt::Debug for Records {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Records")
            .field("backend", &self.store.backend_name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use chrono::{TimeZone, Utc};
    use para_core::models::{Donation, new_id};

    fn donation(amount: u32) -> Donation {
        Donation {
            id: new_id(),
            investigator_id: "inv-1".to_string(),
            donor_id: None,
            donor_name: "Anonymous".to_string(),
            amount_gbp: amount,
            message: None,
            anonymous: true,
            created_at: Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_typed_round_trip() {
        let records = Records::new(Arc::new(MemoryStore::new()));
        let d = donation(500);
        records.insert(Collection::Donations, &d).await.unwrap();

        let back: Donation = records
            .require(Collection::Donations, &d.id, "Donation")
            .await
            .unwrap();
        assert_eq!(back, d);

        let raw = records.raw().get(Collection::Donations, &d.id).await.unwrap().unwrap();
        assert_eq!(raw["created_at"], "2026-01-02T03:04:05Z");
    }

    #[tokio::test]
    async fn test_require_missing_is_not_found() {
        let records = Records::new(Arc::new(MemoryStore::new()));
        let err = records
            .require::<Donation>(Collection::Donations, "nope", "Donation")
            .await
            .unwrap_err();
        assert!(matches!(err, ParaError::NotFound(what) if what == "Donation"));
    }

    #[tokio::test]
    async fn test_malformed_document_is_serialization_error() {
        let store = Arc::new(MemoryStore::new());
        store
            .insert(Collection::Donations, serde_json::json!({"id": "x", "amount_gbp": "lots"}))
            .await
            .unwrap();
        let records = Records::new(store);
        let err = records.get::<Donation>(Collection::Donations, "x").await.unwrap_err();
        assert!(matches!(err, ParaError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_find_typed() {
        let records = Records::new(Arc::new(MemoryStore::new()));
        for amount in [100, 2500, 900] {
            records.insert(Collection::Donations, &donation(amount)).await.unwrap();
        }
        let big: Vec<Donation> = records
            .find(
                Collection::Donations,
                &FindQuery::new()
                    .filter(Condition::gte("amount_gbp", 900))
                    .sort(crate::Sort::desc("amount_gbp")),
            )
            .await
            .unwrap();
        let amounts: Vec<u32> = big.iter().map(|d| d.amount_gbp).collect();
        assert_eq!(amounts, vec![2500, 900]);
        assert_eq!(records.count(Collection::Donations, &[]).await.unwrap(), 3);
    }
}
