use std::collections::HashMap;

use gloo_file::Blob;
use gloo_net::http::{Request, Response};
use serde::de::DeserializeOwned;
use shared::api::{
    DETECT_LANGUAGE_PATH, HISTORY_PATH, IMAGE_FIELD, PREDICT_PATH, REPORT_PATH,
    SET_LANGUAGE_PATH, TRANSLATIONS_PATH,
};
use shared::{
    ClassifyResponse, DetectedLanguage, ErrorResponse, HistoryEntry, HistoryResponse, ImageUpload,
    Language, LanguageSelection, ReportRequest, ReportResponse, ServiceError,
};

fn network(e: impl std::fmt::Display) -> ServiceError {
    ServiceError::Network(e.to_string())
}

async fn into_result<T: DeserializeOwned>(response: Response) -> Result<T, ServiceError> {
    if response.ok() {
        return response
            .json::<T>()
            .await
            .map_err(|e| ServiceError::Decode(e.to_string()));
    }
    let status = response.status();
    let message = response.json::<ErrorResponse>().await.ok().map(|e| e.error);
    log::warn!("Request to {} failed with {}: {:?}", response.url(), status, message);
    Err(ServiceError::Rejected { status, message })
}

fn image_blob(image: &ImageUpload) -> Blob {
    Blob::new_with_options(image.bytes.as_slice(), Some(image.content_type.as_str()))
}

pub async fn classify(
    image: &ImageUpload,
    language: Language,
) -> Result<ClassifyResponse, ServiceError> {
    let form_data = web_sys::FormData::new().map_err(|e| network(format!("{e:?}")))?;
    form_data
        .append_with_blob_and_filename(IMAGE_FIELD, image_blob(image).as_ref(), &image.file_name)
        .map_err(|e| network(format!("{e:?}")))?;

    let response = Request::post(PREDICT_PATH)
        .query([("lang", language.code())])
        .body(form_data)
        .map_err(network)?
        .send()
        .await
        .map_err(network)?;
    into_result(response).await
}

pub async fn generate_report(request: &ReportRequest) -> Result<ReportResponse, ServiceError> {
    let response = Request::post(REPORT_PATH)
        .json(request)
        .map_err(network)?
        .send()
        .await
        .map_err(network)?;
    into_result(response).await
}

/// Recent predictions, newest first.
pub async fn fetch_history() -> Result<Vec<HistoryEntry>, ServiceError> {
    let response = Request::get(HISTORY_PATH)
        .send()
        .await
        .map_err(network)?;
    let body: HistoryResponse = into_result(response).await?;
    Ok(body.history)
}

pub async fn detect_language() -> Result<Language, ServiceError> {
    let response = Request::get(DETECT_LANGUAGE_PATH)
        .send()
        .await
        .map_err(network)?;
    let detected: DetectedLanguage = into_result(response).await?;
    Ok(Language::from_code_or_default(&detected.detected_language))
}

pub async fn fetch_translations(
    language: Language,
) -> Result<HashMap<String, String>, ServiceError> {
    let response = Request::get(&format!("{}/{}", TRANSLATIONS_PATH, language.code()))
        .send()
        .await
        .map_err(network)?;
    into_result(response).await
}

pub async fn persist_language(language: Language) -> Result<(), ServiceError> {
    let response = Request::post(SET_LANGUAGE_PATH)
        .json(&LanguageSelection {
            language: language.code().to_string(),
        })
        .map_err(network)?
        .send()
        .await
        .map_err(network)?;
    into_result::<LanguageSelection>(response).await.map(|_| ())
}

fn content_type_for(file_name: &str) -> &'static str {
    match file_name.rsplit('.').next().map(str::to_ascii_lowercase).as_deref() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/jpeg",
    }
}

/// Fetches a bundled sample image from `/samples/<file_name>`.
pub async fn fetch_sample(file_name: &str) -> Result<ImageUpload, ServiceError> {
    let response = Request::get(&format!("/samples/{file_name}"))
        .send()
        .await
        .map_err(|e| ServiceError::Asset(e.to_string()))?;
    if !response.ok() {
        return Err(ServiceError::Asset(format!(
            "{} {}",
            response.status(),
            response.status_text()
        )));
    }

    let content_type = response
        .headers()
        .get("content-type")
        .filter(|ct| ct.starts_with("image/"))
        .unwrap_or_else(|| content_type_for(file_name).to_string());
    let bytes = response
        .binary()
        .await
        .map_err(|e| ServiceError::Asset(e.to_string()))?;
    Ok(ImageUpload::new(file_name, content_type, bytes))
}
