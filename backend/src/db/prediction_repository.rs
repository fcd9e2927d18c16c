use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

use crate::history::PredictionRecord;

type Item = HashMap<String, AttributeValue>;

#[derive(Clone)]
pub struct PredictionRepository {
    client: Client,
    predictions_table: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("DynamoDB error: {0}")]
    DynamoDb(String),
    #[error("Invalid data format: {0}")]
    InvalidData(String),
}

impl PredictionRepository {
    pub fn new(client: Client, predictions_table: String) -> Self {
        Self {
            client,
            predictions_table,
        }
    }

    pub async fn put_prediction(&self, record: &PredictionRecord) -> Result<(), RepositoryError> {
        match self
            .client
            .put_item()
            .table_name(&self.predictions_table)
            .set_item(Some(Self::prediction_to_item(record)))
            .send()
            .await
        {
            Ok(_) => {
                log::info!(
                    "Recorded prediction {} ({}) in '{}'",
                    record.id,
                    record.predicted_class_name,
                    self.predictions_table
                );
                Ok(())
            }
            Err(e) => {
                log::error!("DynamoDB put_item failed for prediction {}: {:?}", record.id, e);
                Err(RepositoryError::DynamoDb(e.to_string()))
            }
        }
    }

    /// Scans the whole table, then keeps the newest `limit` records.
    pub async fn recent_predictions(
        &self,
        limit: usize,
    ) -> Result<Vec<PredictionRecord>, RepositoryError> {
        let mut records = Vec::new();
        let mut start_key: Option<Item> = None;

        loop {
            let result = self
                .client
                .scan()
                .table_name(&self.predictions_table)
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| RepositoryError::DynamoDb(e.to_string()))?;

            for item in result.items.unwrap_or_default() {
                match Self::parse_prediction_from_item(item) {
                    Ok(record) => records.push(record),
                    Err(e) => log::warn!("Skipping malformed history item: {}", e),
                }
            }

            match result.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        Ok(crate::history::newest_first(records, limit))
    }

    fn prediction_to_item(record: &PredictionRecord) -> Item {
        let mut item = HashMap::new();
        item.insert("id".to_string(), AttributeValue::S(record.id.to_string()));
        item.insert(
            "created_at".to_string(),
            AttributeValue::S(record.created_at.to_rfc3339()),
        );
        item.insert(
            "predicted_class_name".to_string(),
            AttributeValue::S(record.predicted_class_name.clone()),
        );
        item.insert(
            "confidence".to_string(),
            AttributeValue::N(record.confidence.to_string()),
        );
        item.insert(
            "image_hash".to_string(),
            AttributeValue::S(record.image_hash.clone()),
        );
        item.insert(
            "file_name".to_string(),
            AttributeValue::S(record.file_name.clone()),
        );
        item.insert(
            "mime_type".to_string(),
            AttributeValue::S(record.mime_type.clone()),
        );
        if let Some(image_key) = &record.image_key {
            item.insert("s3_key".to_string(), AttributeValue::S(image_key.clone()));
        }
        item
    }

    fn parse_prediction_from_item(item: Item) -> Result<PredictionRecord, RepositoryError> {
        let string = |name: &str| {
            item.get(name)
                .and_then(|v| v.as_s().ok())
                .cloned()
                .ok_or_else(|| RepositoryError::InvalidData(format!("Invalid {name}")))
        };

        let id = Uuid::parse_str(&string("id")?)
            .map_err(|_| RepositoryError::InvalidData("Invalid id".to_string()))?;

        let created_at = DateTime::parse_from_rfc3339(&string("created_at")?)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| RepositoryError::InvalidData("Invalid created_at".to_string()))?;

        let confidence = item
            .get("confidence")
            .and_then(|v| v.as_n().ok())
            .and_then(|s| s.parse::<f64>().ok())
            .ok_or_else(|| RepositoryError::InvalidData("Invalid confidence".to_string()))?;

        Ok(PredictionRecord {
            id,
            created_at,
            predicted_class_name: string("predicted_class_name")?,
            confidence,
            image_hash: string("image_hash")?,
            file_name: string("file_name").unwrap_or_default(),
            mime_type: string("mime_type").unwrap_or_default(),
            image_key: string("s3_key").ok(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::NewPrediction;

    fn record(image_key: Option<&str>) -> PredictionRecord {
        PredictionRecord::new(
            &NewPrediction {
                image: vec![1, 2, 3],
                file_name: "leaf.png".into(),
                mime_type: "image/png".into(),
                predicted_class_name: "Grape___Black_rot".into(),
                confidence: 88.125,
            },
            image_key.map(str::to_string),
        )
    }

    #[test]
    fn items_read_back_as_the_same_record() {
        let original = record(Some("images/abc.png"));
        let item = PredictionRepository::prediction_to_item(&original);
        assert!(matches!(item.get("confidence"), Some(AttributeValue::N(_))));

        let parsed = PredictionRepository::parse_prediction_from_item(item).unwrap();
        assert_eq!(parsed.id, original.id);
        assert_eq!(parsed.created_at.timestamp_micros(), original.created_at.timestamp_micros());
        assert_eq!(parsed.confidence, 88.125);
        assert_eq!(parsed.image_key.as_deref(), Some("images/abc.png"));
    }

    #[test]
    fn image_key_is_optional() {
        let item = PredictionRepository::prediction_to_item(&record(None));
        assert!(!item.contains_key("s3_key"));
        let parsed = PredictionRepository::parse_prediction_from_item(item).unwrap();
        assert!(parsed.image_key.is_none());
    }

    #[test]
    fn required_attributes_are_enforced() {
        let mut item = PredictionRepository::prediction_to_item(&record(None));
        item.remove("predicted_class_name");
        let err = PredictionRepository::parse_prediction_from_item(item).unwrap_err();
        assert!(err.to_string().contains("predicted_class_name"));

        let mut item = PredictionRepository::prediction_to_item(&record(None));
        item.insert("confidence".into(), AttributeValue::S("high".into()));
        assert!(PredictionRepository::parse_prediction_from_item(item).is_err());
    }
}
