use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::{Language, QuestionnaireAnswers};

use super::prompt::build_prompt;
use super::{ReportError, ReportGenerator};
use crate::config::GeminiConfig;

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize, Debug)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize, Debug)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize, Debug)]
struct UpstreamError {
    error: UpstreamErrorBody,
}

#[derive(Deserialize, Debug)]
struct UpstreamErrorBody {
    message: String,
}

impl GenerateResponse {
    fn into_text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

/// Calls the Gemini `generateContent` REST endpoint.
#[derive(Clone)]
pub struct GeminiReportGenerator {
    client: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
}

impl GeminiReportGenerator {
    pub fn new(config: &GeminiConfig) -> Result<Self, ReportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let endpoint = format!(
            "{}/models/{}:generateContent",
            config.base_url.trim_end_matches('/'),
            urlencoding::encode(&config.model)
        );
        if config.api_key.is_none() {
            log::warn!("GEMINI_API_KEY is not set; report requests will be refused");
        }
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            endpoint,
        })
    }
}

#[async_trait]
impl ReportGenerator for GeminiReportGenerator {
    async fn generate(
        &self,
        disease_name: &str,
        answers: &QuestionnaireAnswers,
        language: Language,
    ) -> Result<String, ReportError> {
        let api_key = self.api_key.as_deref().ok_or(ReportError::NotConfigured)?;
        let prompt = build_prompt(disease_name, answers, language);
        let body = GenerateRequest {
            contents: [Content {
                role: "user",
                parts: [Part { text: &prompt }],
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<UpstreamError>(&raw)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| format!("HTTP {status}"));
            log::error!("Gemini responded {}: {}", status, raw);
            return Err(ReportError::Upstream(message));
        }

        let parsed: GenerateResponse = response.json().await?;
        parsed.into_text().ok_or(ReportError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_key: Option<&str>) -> GeminiConfig {
        GeminiConfig {
            api_key: api_key.map(str::to_string),
            model: "gemini-2.5-flash".into(),
            base_url: "https://generativelanguage.googleapis.com/v1beta/".into(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn endpoint_joins_base_and_model() {
        let generator = GeminiReportGenerator::new(&config(Some("k"))).unwrap();
        assert_eq!(
            generator.endpoint,
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[actix_web::test]
    async fn missing_key_is_refused_without_a_request() {
        let generator = GeminiReportGenerator::new(&config(None)).unwrap();
        let err = generator
            .generate("Apple___scab", &QuestionnaireAnswers::default(), Language::En)
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::NotConfigured));
    }

    #[test]
    fn candidate_parts_are_concatenated() {
        let parsed: GenerateResponse = serde_json::from_str(
            r##"{"candidates":[{"content":{"parts":[{"text":"# Diagnosis\n"},{"text":"Scab."}],"role":"model"}}]}"##,
        )
        .unwrap();
        assert_eq!(parsed.into_text().as_deref(), Some("# Diagnosis\nScab."));
    }

    #[test]
    fn blocked_or_blank_candidates_have_no_text() {
        let blocked: GenerateResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        assert!(blocked.into_text().is_none());
        let blank: GenerateResponse =
            serde_json::from_str(r#"{"candidates":[{"content":{"parts":[{"text":"  "}]}}]}"#)
                .unwrap();
        assert!(blank.into_text().is_none());
    }

    #[test]
    fn request_body_matches_rest_shape() {
        let json = serde_json::to_value(GenerateRequest {
            contents: [Content {
                role: "user",
                parts: [Part { text: "hello" }],
            }],
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"contents": [{"role": "user", "parts": [{"text": "hello"}]}]})
        );
    }
}
