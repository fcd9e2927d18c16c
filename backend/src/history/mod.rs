//! Record of past predictions, served by `GET /history`.

pub mod history_service;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::HistoryEntry;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::prediction_repository::RepositoryError;
use crate::storage::s3_service::{S3Service, S3ServiceError};

pub use history_service::AwsHistory;

/// Entries returned by `GET /history`.
pub const HISTORY_LIMIT: usize = 50;

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
    #[error("Storage error: {0}")]
    Storage(#[from] S3ServiceError),
}

/// A successful classification waiting to be recorded.
#[derive(Debug, Clone)]
pub struct NewPrediction {
    pub image: Vec<u8>,
    pub file_name: String,
    pub mime_type: String,
    pub predicted_class_name: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub predicted_class_name: String,
    pub confidence: f64,
    pub image_hash: String,
    pub file_name: String,
    pub mime_type: String,
    /// Object key when the image itself was stored.
    pub image_key: Option<String>,
}

impl PredictionRecord {
    pub fn new(prediction: &NewPrediction, image_key: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            predicted_class_name: prediction.predicted_class_name.clone(),
            confidence: prediction.confidence,
            image_hash: S3Service::calculate_image_hash(&prediction.image),
            file_name: prediction.file_name.clone(),
            mime_type: prediction.mime_type.clone(),
            image_key,
        }
    }

    pub fn to_entry(&self) -> HistoryEntry {
        HistoryEntry {
            id: self.id.to_string(),
            timestamp: self.created_at.to_rfc3339(),
            predicted_class_name: self.predicted_class_name.clone(),
            confidence: self.confidence,
            image_hash: self.image_hash.clone(),
            file_name: self.file_name.clone(),
        }
    }
}

/// Newest first, at most `limit`.
pub fn newest_first(mut records: Vec<PredictionRecord>, limit: usize) -> Vec<PredictionRecord> {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    records.truncate(limit);
    records
}

#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn record(&self, prediction: NewPrediction) -> Result<PredictionRecord, HistoryError>;

    async fn recent(&self, limit: usize) -> Result<Vec<PredictionRecord>, HistoryError>;
}

/// Process-local history used when no table is configured.
pub struct InMemoryHistory {
    records: RwLock<Vec<PredictionRecord>>,
    capacity: usize,
}

impl InMemoryHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            capacity,
        }
    }
}

impl Default for InMemoryHistory {
    fn default() -> Self {
        Self::new(HISTORY_LIMIT * 4)
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistory {
    async fn record(&self, prediction: NewPrediction) -> Result<PredictionRecord, HistoryError> {
        let record = PredictionRecord::new(&prediction, None);
        let mut records = self.records.write().await;
        records.push(record.clone());
        if records.len() > self.capacity {
            let excess = records.len() - self.capacity;
            records.drain(..excess);
        }
        Ok(record)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<PredictionRecord>, HistoryError> {
        let records = self.records.read().await.clone();
        Ok(newest_first(records, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn prediction(name: &str) -> NewPrediction {
        NewPrediction {
            image: name.as_bytes().to_vec(),
            file_name: format!("{name}.jpg"),
            mime_type: "image/jpeg".into(),
            predicted_class_name: name.into(),
            confidence: 80.0,
        }
    }

    #[actix_web::test]
    async fn recent_returns_newest_first_within_limit() {
        let history = InMemoryHistory::default();
        for name in ["a", "b", "c"] {
            history.record(prediction(name)).await.unwrap();
        }
        let recent = history.recent(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert!(recent[0].created_at >= recent[1].created_at);
    }

    #[actix_web::test]
    async fn capacity_drops_the_oldest() {
        let history = InMemoryHistory::new(2);
        for name in ["a", "b", "c"] {
            history.record(prediction(name)).await.unwrap();
        }
        let names: Vec<String> = history
            .recent(10)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.predicted_class_name)
            .collect();
        assert_eq!(names.len(), 2);
        assert!(!names.contains(&"a".to_string()));
    }

    #[test]
    fn sorting_is_by_timestamp() {
        let base = PredictionRecord::new(&prediction("x"), None);
        let older = PredictionRecord {
            created_at: base.created_at - Duration::minutes(5),
            ..base.clone()
        };
        let sorted = newest_first(vec![older.clone(), base.clone()], 50);
        assert_eq!(sorted, vec![base, older]);
    }

    #[test]
    fn entries_carry_hash_and_rfc3339_time() {
        let record = PredictionRecord::new(&prediction("abc"), None);
        let entry = record.to_entry();
        assert_eq!(
            entry.image_hash,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert!(chrono::DateTime::parse_from_rfc3339(&entry.timestamp).is_ok());
        assert_eq!(entry.file_name, "abc.jpg");
    }
}
