//! Analysis record store.
//!
//! Durable persistence belongs to the hosted platform (its table API with
//! row-level authorization); this trait is the seam the handlers talk
//! through. The in-memory implementation backs tests and single-node
//! development deployments.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use fsight_models::{AnalysisId, AnalysisRecord};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Persistence interface for analysis records.
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    async fn create(&self, record: AnalysisRecord) -> StoreResult<()>;

    async fn get(&self, id: &AnalysisId) -> StoreResult<Option<AnalysisRecord>>;

    /// All records owned by a user, newest first.
    async fn list_for_user(&self, user_id: &str) -> StoreResult<Vec<AnalysisRecord>>;

    async fn update(&self, record: AnalysisRecord) -> StoreResult<()>;

    async fn delete(&self, id: &AnalysisId) -> StoreResult<()>;
}

/// In-memory record store.
#[derive(Default)]
pub struct MemoryAnalysisStore {
    records: RwLock<HashMap<String, AnalysisRecord>>,
}

impl MemoryAnalysisStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

#[async_trait]
impl AnalysisStore for MemoryAnalysisStore {
    async fn create(&self, record: AnalysisRecord) -> StoreResult<()> {
        let mut records = self.records.write().await;
        records.insert(record.id.to_string(), record);
        Ok(())
    }

    async fn get(&self, id: &AnalysisId) -> StoreResult<Option<AnalysisRecord>> {
        let records = self.records.read().await;
        Ok(records.get(id.as_str()).cloned())
    }

    async fn list_for_user(&self, user_id: &str) -> StoreResult<Vec<AnalysisRecord>> {
        let records = self.records.read().await;
        let mut owned: Vec<AnalysisRecord> = records
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn update(&self, record: AnalysisRecord) -> StoreResult<()> {
        let mut records = self.records.write().await;
        if !records.contains_key(record.id.as_str()) {
            return Err(StoreError::NotFound(record.id.to_string()));
        }
        records.insert(record.id.to_string(), record);
        Ok(())
    }

    async fn delete(&self, id: &AnalysisId) -> StoreResult<()> {
        let mut records = self.records.write().await;
        records
            .remove(id.as_str())
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fsight_models::{AnalysisStatus, CharacteristicSet, MovementContext};

    fn record(user_id: &str, title: &str) -> AnalysisRecord {
        let id = AnalysisId::new();
        AnalysisRecord::new(
            id.clone(),
            user_id,
            title,
            MovementContext::new("Saque", "Ana", "Tenis", "Individual"),
            CharacteristicSet::try_from(vec![
                "A".to_string(),
                "B".to_string(),
                "C".to_string(),
                "D".to_string(),
                "E".to_string(),
            ])
            .unwrap(),
            format!("videos/{}/{}.mp4", user_id, id),
            "video/mp4",
        )
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = MemoryAnalysisStore::new();
        let r = record("user-1", "first");
        let id = r.id.clone();

        store.create(r).await.unwrap();
        let fetched = store.get(&id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "first");
        assert_eq!(fetched.status, AnalysisStatus::Processing);
    }

    #[tokio::test]
    async fn test_list_is_per_user_and_newest_first() {
        let store = MemoryAnalysisStore::new();
        let mut first = record("user-1", "older");
        first.created_at = chrono::Utc::now() - chrono::Duration::minutes(5);
        store.create(first).await.unwrap();
        store.create(record("user-1", "newer")).await.unwrap();
        store.create(record("user-2", "foreign")).await.unwrap();

        let listed = store.list_for_user("user-1").await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].title, "newer");
        assert_eq!(listed[1].title, "older");
    }

    #[tokio::test]
    async fn test_update_missing_record_fails() {
        let store = MemoryAnalysisStore::new();
        let err = store.update(record("user-1", "ghost")).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryAnalysisStore::new();
        let r = record("user-1", "gone");
        let id = r.id.clone();
        store.create(r).await.unwrap();

        store.delete(&id).await.unwrap();
        assert!(store.get(&id).await.unwrap().is_none());
        assert!(matches!(
            store.delete(&id).await,
            Err(StoreError::NotFound(_))
        ));
    }
}
