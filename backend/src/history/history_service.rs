use async_trait::async_trait;

use super::{HistoryError, HistoryStore, NewPrediction, PredictionRecord};
use crate::db::prediction_repository::PredictionRepository;
use crate::storage::s3_service::{S3Service, S3ServiceError};

/// History kept in DynamoDB, with the analysed images in S3 when a bucket
/// is configured.
#[derive(Clone)]
pub struct AwsHistory {
    db_repo: PredictionRepository,
    s3_service: Option<S3Service>,
}

impl AwsHistory {
    pub fn new(db_repo: PredictionRepository, s3_service: Option<S3Service>) -> Self {
        Self {
            db_repo,
            s3_service,
        }
    }

    async fn store_image(
        &self,
        s3_service: &S3Service,
        prediction: &NewPrediction,
    ) -> Result<Option<String>, S3ServiceError> {
        let file_extension = match S3Service::extract_file_extension(&prediction.mime_type) {
            Ok(ext) => ext,
            Err(e) => {
                log::warn!("Not storing image {}: {}", prediction.file_name, e);
                return Ok(None);
            }
        };
        let image_hash = S3Service::calculate_image_hash(&prediction.image);
        let s3_key = S3Service::generate_s3_key(&image_hash, file_extension);

        if s3_service.exists(&s3_key).await {
            log::debug!("Image {} already stored", s3_key);
        } else {
            s3_service
                .upload_image(&prediction.image, &s3_key, &prediction.mime_type)
                .await?;
        }
        Ok(Some(s3_key))
    }
}

#[async_trait]
impl HistoryStore for AwsHistory {
    async fn record(&self, prediction: NewPrediction) -> Result<PredictionRecord, HistoryError> {
        let image_key = match &self.s3_service {
            Some(s3_service) => self.store_image(s3_service, &prediction).await?,
            None => None,
        };
        let record = PredictionRecord::new(&prediction, image_key);
        self.db_repo.put_prediction(&record).await?;
        Ok(record)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<PredictionRecord>, HistoryError> {
        Ok(self.db_repo.recent_predictions(limit).await?)
    }
}
