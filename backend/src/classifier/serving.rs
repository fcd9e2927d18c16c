use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::labels::ClassLabels;
use super::preprocess::{preprocess, ImageTensor};
use super::{Classifier, ClassifierError, Prediction};
use crate::config::{ImageConfig, ModelConfig};

#[derive(Serialize)]
struct PredictRequest<'a> {
    instances: [&'a ImageTensor; 1],
}

#[derive(Deserialize)]
struct PredictResponse {
    predictions: Vec<Vec<f32>>,
}

/// Classifier backed by a TensorFlow-Serving REST `:predict` endpoint.
#[derive(Clone)]
pub struct TfServingClassifier {
    client: reqwest::Client,
    endpoint: String,
    image: ImageConfig,
    labels: ClassLabels,
}

impl TfServingClassifier {
    pub fn new(config: &ModelConfig) -> Result<Self, ClassifierError> {
        let labels = ClassLabels::load(&config.class_indices)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        log::info!(
            "Model endpoint {} with {} classes",
            config.serving_url,
            labels.len()
        );
        Ok(Self {
            client,
            endpoint: config.serving_url.clone(),
            image: config.image.clone(),
            labels,
        })
    }
}

#[async_trait]
impl Classifier for TfServingClassifier {
    async fn classify(&self, image: &[u8]) -> Result<Prediction, ClassifierError> {
        let tensor = preprocess(image, &self.image)?;

        let response = self
            .client
            .post(&self.endpoint)
            .json(&PredictRequest { instances: [&tensor] })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("Model server responded {}: {}", status, body);
            return Err(ClassifierError::Serving {
                status: status.as_u16(),
                body,
            });
        }

        let body: PredictResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::MalformedOutput(e.to_string()))?;
        let probabilities = body
            .predictions
            .into_iter()
            .next()
            .ok_or_else(|| ClassifierError::MalformedOutput("empty predictions".into()))?;

        let prediction = self.labels.top(&probabilities)?;
        log::debug!(
            "Classified as {} ({:.2}%)",
            prediction.class_name,
            prediction.confidence
        );
        Ok(prediction)
    }
}
