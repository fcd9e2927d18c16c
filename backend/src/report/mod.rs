//! Treatment reports written by a hosted language model.

pub mod gemini;
pub mod prompt;

use async_trait::async_trait;
use shared::{Language, QuestionnaireAnswers};

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Report service is not configured. Set GEMINI_API_KEY on the server.")]
    NotConfigured,
    #[error("An error occurred with the report model: {0}")]
    Upstream(String),
    #[error("The report model returned no text")]
    EmptyResponse,
    #[error("Report model request failed: {0}")]
    Http(#[from] reqwest::Error),
}

#[async_trait]
pub trait ReportGenerator: Send + Sync {
    /// Returns the report as markdown.
    async fn generate(
        &self,
        disease_name: &str,
        answers: &QuestionnaireAnswers,
        language: Language,
    ) -> Result<String, ReportError>;
}
