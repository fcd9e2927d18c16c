use serde::{Deserialize, Serialize};

use crate::questionnaire::QuestionnaireAnswers;

pub const PREDICT_PATH: &str = "/predict";
pub const REPORT_PATH: &str = "/get_diagnosis";
pub const HISTORY_PATH: &str = "/history";
pub const LANGUAGES_PATH: &str = "/api/languages";
pub const DETECT_LANGUAGE_PATH: &str = "/api/detect_language";
pub const TRANSLATIONS_PATH: &str = "/api/translations";
pub const SET_LANGUAGE_PATH: &str = "/api/set_language";

/// Multipart field carrying the uploaded image.
pub const IMAGE_FIELD: &str = "image";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ClassifyResponse {
    pub predicted_class_name: String,
    /// Percentage on a 0-100 scale.
    pub confidence: f64,
    /// Disease name in the caller's language, when a translation exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub localized_name: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ReportRequest {
    #[serde(default)]
    pub disease_name: String,
    #[serde(default)]
    pub user_context: QuestionnaireAnswers,
    #[serde(default)]
    pub language: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ReportResponse {
    /// Markdown.
    pub report: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DetectedLanguage {
    pub detected_language: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LanguageSelection {
    pub language: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LanguageOption {
    pub code: String,
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HistoryEntry {
    pub id: String,
    /// RFC 3339, UTC.
    pub timestamp: String,
    pub predicted_class_name: String,
    pub confidence: f64,
    pub image_hash: String,
    pub file_name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct HistoryResponse {
    pub history: Vec<HistoryEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_request_tolerates_missing_context_and_language() {
        let request: ReportRequest =
            serde_json::from_str(r#"{"disease_name":"Tomato___Late_blight"}"#).unwrap();
        assert_eq!(request.disease_name, "Tomato___Late_blight");
        assert_eq!(request.user_context, QuestionnaireAnswers::default());
        assert!(request.language.is_empty());
    }

    #[test]
    fn classify_response_omits_missing_localized_name() {
        let response = ClassifyResponse {
            predicted_class_name: "Apple_Black_rot".into(),
            confidence: 92.5,
            localized_name: None,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"predicted_class_name": "Apple_Black_rot", "confidence": 92.5})
        );
    }
}
