use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use shared::ErrorResponse;

use crate::classifier::ClassifierError;
use crate::history::HistoryError;
use crate::report::ReportError;

/// Every failure a handler can return. Rendered as `{"error": "..."}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Error during prediction: {0}")]
    Prediction(#[from] ClassifierError),
    #[error("{0}")]
    Report(#[from] ReportError),
    #[error("Error fetching history: {0}")]
    History(#[from] HistoryError),
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::UnsupportedLanguage(_) => StatusCode::BAD_REQUEST,
            ApiError::Prediction(ClassifierError::InvalidImage(_)) => StatusCode::BAD_REQUEST,
            ApiError::Prediction(_) | ApiError::History(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Report(ReportError::NotConfigured) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Report(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn errors_render_as_json_with_status() {
        let err = ApiError::bad_request("No image file provided");
        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body()).await.unwrap();
        let parsed: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed.error, "No image file provided");
    }

    #[test]
    fn report_statuses_distinguish_configuration_from_upstream() {
        assert_eq!(
            ApiError::from(ReportError::NotConfigured).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(ReportError::EmptyResponse).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn undecodable_images_are_client_errors() {
        let err = ApiError::from(ClassifierError::InvalidImage("truncated".into()));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().starts_with("Error during prediction"));
    }
}
