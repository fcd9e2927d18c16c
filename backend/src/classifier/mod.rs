//! Leaf-disease inference. The trained network is hosted by a
//! TensorFlow-Serving compatible endpoint; this module prepares its input
//! and turns its probabilities into a named prediction.

pub mod labels;
pub mod preprocess;
pub mod serving;

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("Could not decode image: {0}")]
    InvalidImage(String),
    #[error("Model server request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Model server returned {status}: {body}")]
    Serving { status: u16, body: String },
    #[error("Malformed model output: {0}")]
    MalformedOutput(String),
    #[error("Class index {0} has no label")]
    UnknownClass(usize),
    #[error("Invalid class indices: {0}")]
    Labels(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub class_name: String,
    /// Percentage on a 0-100 scale.
    pub confidence: f64,
}

#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, image: &[u8]) -> Result<Prediction, ClassifierError>;
}
