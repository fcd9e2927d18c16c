use actix_files::Files;
use actix_multipart::{Field, Multipart};
use actix_web::cookie::{Cookie, SameSite, time::Duration};
use actix_web::{HttpRequest, HttpResponse, web};
use futures::{StreamExt, TryStreamExt};
use log::{error, info, warn};
use shared::api::{
    DETECT_LANGUAGE_PATH, HISTORY_PATH, IMAGE_FIELD, LANGUAGES_PATH, PREDICT_PATH, REPORT_PATH,
    SET_LANGUAGE_PATH, TRANSLATIONS_PATH,
};
use shared::{
    ClassifyResponse, DetectedLanguage, HistoryResponse, Language, LanguageOption,
    LanguageSelection, ReportRequest, ReportResponse,
};

use crate::classifier::Classifier;
use crate::error::ApiError;
use crate::history::{HISTORY_LIMIT, HistoryStore, NewPrediction};
use crate::i18n::{LANGUAGE_COOKIE, LanguageDetector, TranslationManager, translate_disease_name};
use crate::report::ReportGenerator;
use crate::storage::s3_service::MAX_IMAGE_BYTES;

const JSON_LIMIT: usize = 64 * 1024;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(JSON_LIMIT)
            .error_handler(|err, _req| {
                warn!("Rejected JSON body: {}", err);
                ApiError::bad_request("Invalid request data").into()
            }),
    )
    .service(web::resource(PREDICT_PATH).route(web::post().to(predict)))
    .service(web::resource(REPORT_PATH).route(web::post().to(get_diagnosis)))
    .service(web::resource(HISTORY_PATH).route(web::get().to(history)))
    .service(web::resource(LANGUAGES_PATH).route(web::get().to(languages)))
    .service(web::resource(DETECT_LANGUAGE_PATH).route(web::get().to(detect_language)))
    .service(
        web::resource(format!("{TRANSLATIONS_PATH}/{{lang}}")).route(web::get().to(translations)),
    )
    .service(web::resource(SET_LANGUAGE_PATH).route(web::post().to(set_language)));
}

/// Serves the compiled frontend. Registered last so API routes win.
pub fn configure_static(cfg: &mut web::ServiceConfig, frontend_dir: String) {
    cfg.service(Files::new("/", frontend_dir).index_file("index.html"));
}

struct UploadedImage {
    file_name: String,
    mime_type: String,
    bytes: Vec<u8>,
}

async fn read_field(field: &mut Field) -> Result<Vec<u8>, ApiError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| ApiError::bad_request(format!("Invalid upload: {e}")))?;
        if bytes.len() + chunk.len() > MAX_IMAGE_BYTES {
            return Err(ApiError::bad_request(format!(
                "Image is larger than {} MB",
                MAX_IMAGE_BYTES / (1024 * 1024)
            )));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

/// Pulls the `image` part out of the form.
async fn read_image(mut payload: Multipart) -> Result<UploadedImage, ApiError> {
    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid upload: {e}")))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .unwrap_or_default()
            .to_string();
        if file_name.trim().is_empty() {
            return Err(ApiError::bad_request("No selected file"));
        }
        let declared = field.content_type().map(|ct| ct.essence_str().to_string());

        let bytes = read_field(&mut field).await?;
        let mime_type = match declared {
            Some(mime) if mime != "application/octet-stream" => mime,
            _ => image::guess_format(&bytes)
                .map(|format| format.to_mime_type().to_string())
                .unwrap_or_default(),
        };
        if !mime_type.starts_with("image/") {
            return Err(ApiError::bad_request(format!(
                "\"{file_name}\" is not an image"
            )));
        }

        return Ok(UploadedImage {
            file_name,
            mime_type,
            bytes,
        });
    }
    Err(ApiError::bad_request("No image file provided"))
}

async fn predict(
    req: HttpRequest,
    classifier: web::Data<dyn Classifier>,
    history: web::Data<dyn HistoryStore>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let upload = read_image(payload).await?;
    info!(
        "Classifying {} ({}, {} bytes)",
        upload.file_name,
        upload.mime_type,
        upload.bytes.len()
    );

    let prediction = classifier.classify(&upload.bytes).await.map_err(|e| {
        error!("Prediction failed for {}: {}", upload.file_name, e);
        ApiError::from(e)
    })?;

    let language = LanguageDetector::detect_local(&req);
    let response = ClassifyResponse {
        localized_name: translate_disease_name(&prediction.class_name, language),
        predicted_class_name: prediction.class_name.clone(),
        confidence: prediction.confidence,
    };

    let record = NewPrediction {
        image: upload.bytes,
        file_name: upload.file_name,
        mime_type: upload.mime_type,
        predicted_class_name: prediction.class_name,
        confidence: prediction.confidence,
    };
    actix_web::rt::spawn(async move {
        if let Err(e) = history.record(record).await {
            error!("Failed to record prediction history: {}", e);
        }
    });

    Ok(HttpResponse::Ok().json(response))
}

async fn get_diagnosis(
    req: HttpRequest,
    reports: web::Data<dyn ReportGenerator>,
    body: web::Json<ReportRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = body.into_inner();
    let disease_name = request.disease_name.trim();
    if disease_name.is_empty() {
        return Err(ApiError::bad_request("Disease name is required for diagnosis"));
    }

    let language = Language::from_code(&request.language)
        .unwrap_or_else(|| LanguageDetector::detect_local(&req));
    info!("Generating {} report for {}", language.code(), disease_name);

    let report = reports
        .generate(disease_name, &request.user_context, language)
        .await
        .map_err(|e| {
            error!("Report generation failed: {}", e);
            ApiError::from(e)
        })?;

    Ok(HttpResponse::Ok().json(ReportResponse { report }))
}

async fn history(history: web::Data<dyn HistoryStore>) -> Result<HttpResponse, ApiError> {
    let records = history.recent(HISTORY_LIMIT).await?;
    Ok(HttpResponse::Ok().json(HistoryResponse {
        history: records.iter().map(|r| r.to_entry()).collect(),
    }))
}

async fn languages() -> HttpResponse {
    let options: Vec<LanguageOption> = Language::all()
        .map(|language| LanguageOption {
            code: language.code().to_string(),
            name: language.native_name().to_string(),
        })
        .collect();
    HttpResponse::Ok().json(options)
}

async fn detect_language(req: HttpRequest, detector: web::Data<LanguageDetector>) -> HttpResponse {
    let language = detector.detect(&req).await;
    HttpResponse::Ok().json(DetectedLanguage {
        detected_language: language.code().to_string(),
    })
}

async fn translations(
    manager: web::Data<TranslationManager>,
    path: web::Path<String>,
) -> HttpResponse {
    let language = Language::from_code_or_default(&path.into_inner());
    let strings = manager.translations(language);
    HttpResponse::Ok().json(&*strings)
}

async fn set_language(body: web::Json<LanguageSelection>) -> Result<HttpResponse, ApiError> {
    let requested = body.into_inner().language;
    let language = Language::from_code(&requested)
        .ok_or_else(|| ApiError::UnsupportedLanguage(requested.clone()))?;

    let cookie = Cookie::build(LANGUAGE_COOKIE, language.code())
        .path("/")
        .max_age(Duration::days(365))
        .same_site(SameSite::Lax)
        .finish();

    Ok(HttpResponse::Ok().cookie(cookie).json(LanguageSelection {
        language: language.code().to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{ClassifierError, Prediction};
    use crate::config::GeolocationConfig;
    use crate::history::InMemoryHistory;
    use crate::report::ReportError;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use async_trait::async_trait;
    use shared::{ErrorResponse, QuestionnaireAnswers};
    use std::sync::{Arc, Mutex};

    const BOUNDARY: &str = "----cropdoc-test-boundary";

    struct StubClassifier(Result<Prediction, String>);

    #[async_trait]
    impl Classifier for StubClassifier {
        async fn classify(&self, _image: &[u8]) -> Result<Prediction, ClassifierError> {
            self.0.clone().map_err(ClassifierError::MalformedOutput)
        }
    }

    #[derive(Default)]
    struct StubReports {
        configured: bool,
        seen: Mutex<Vec<(String, QuestionnaireAnswers, Language)>>,
    }

    #[async_trait]
    impl ReportGenerator for StubReports {
        async fn generate(
            &self,
            disease_name: &str,
            answers: &QuestionnaireAnswers,
            language: Language,
        ) -> Result<String, ReportError> {
            if !self.configured {
                return Err(ReportError::NotConfigured);
            }
            self.seen
                .lock()
                .unwrap()
                .push((disease_name.to_string(), answers.clone(), language));
            Ok(format!("# Diagnosis\n{disease_name}"))
        }
    }

    struct Fixture {
        classifier: Arc<dyn Classifier>,
        reports: Arc<StubReports>,
        history: Arc<InMemoryHistory>,
    }

    impl Fixture {
        fn new(prediction: Result<Prediction, String>, configured: bool) -> Self {
            Self {
                classifier: Arc::new(StubClassifier(prediction)),
                reports: Arc::new(StubReports {
                    configured,
                    ..Default::default()
                }),
                history: Arc::new(InMemoryHistory::default()),
            }
        }

        fn black_rot() -> Self {
            Self::new(
                Ok(Prediction {
                    class_name: "Apple___Black_rot".into(),
                    confidence: 92.5,
                }),
                true,
            )
        }

        fn app(
            &self,
        ) -> App<
            impl actix_web::dev::ServiceFactory<
                actix_web::dev::ServiceRequest,
                Config = (),
                Response = actix_web::dev::ServiceResponse,
                Error = actix_web::Error,
                InitError = (),
            > + use<>,
        > {
            let reports: Arc<dyn ReportGenerator> = self.reports.clone();
            let history: Arc<dyn HistoryStore> = self.history.clone();
            let translations =
                TranslationManager::new(concat!(env!("CARGO_MANIFEST_DIR"), "/translations"))
                    .unwrap();
            let detector = LanguageDetector::new(&GeolocationConfig {
                enabled: false,
                endpoint: "http://127.0.0.1:9/json".into(),
            })
            .unwrap();

            App::new()
                .app_data(web::Data::from(self.classifier.clone()))
                .app_data(web::Data::from(reports))
                .app_data(web::Data::from(history))
                .app_data(web::Data::new(translations))
                .app_data(web::Data::new(detector))
                .configure(configure_routes)
        }
    }

    fn multipart(field: &str, file_name: &str, content_type: &str, body: &[u8]) -> Vec<u8> {
        let mut out = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .into_bytes();
        out.extend_from_slice(body);
        out.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        out
    }

    fn upload(body: Vec<u8>) -> test::TestRequest {
        test::TestRequest::post()
            .uri(PREDICT_PATH)
            .insert_header((
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(body)
    }

    async fn error_of(response: actix_web::dev::ServiceResponse) -> (StatusCode, String) {
        let status = response.status();
        let body: ErrorResponse = test::read_body_json(response).await;
        (status, body.error)
    }

    #[actix_web::test]
    async fn predict_returns_class_and_confidence() {
        let fixture = Fixture::black_rot();
        let app = test::init_service(fixture.app()).await;

        let req = upload(multipart("image", "leaf.jpg", "image/jpeg", &[0xFF, 0xD8, 0xFF]))
            .to_request();
        let body: ClassifyResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.predicted_class_name, "Apple___Black_rot");
        assert_eq!(body.confidence, 92.5);
        assert_eq!(body.localized_name, None);
    }

    #[actix_web::test]
    async fn predict_localizes_name_for_language_cookie() {
        let fixture = Fixture::black_rot();
        let app = test::init_service(fixture.app()).await;

        let req = upload(multipart("image", "leaf.jpg", "image/jpeg", &[1, 2, 3]))
            .cookie(Cookie::new(LANGUAGE_COOKIE, "hi"))
            .to_request();
        let body: ClassifyResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.localized_name.as_deref(), Some("सेब काली सड़न"));
    }

    #[actix_web::test]
    async fn predict_records_history_in_background() {
        let fixture = Fixture::black_rot();
        let app = test::init_service(fixture.app()).await;

        let req = upload(multipart("image", "leaf.png", "image/png", &[9, 9])).to_request();
        assert!(test::call_service(&app, req).await.status().is_success());

        let mut recorded = Vec::new();
        for _ in 0..50 {
            recorded = fixture.history.recent(HISTORY_LIMIT).await.unwrap();
            if !recorded.is_empty() {
                break;
            }
            actix_web::rt::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].file_name, "leaf.png");
        assert_eq!(recorded[0].mime_type, "image/png");
    }

    #[actix_web::test]
    async fn predict_rejects_bad_uploads() {
        let fixture = Fixture::black_rot();
        let app = test::init_service(fixture.app()).await;

        let cases = [
            (multipart("photo", "leaf.jpg", "image/jpeg", &[1]), "No image file provided"),
            (multipart("image", "", "image/jpeg", &[1]), "No selected file"),
            (
                multipart("image", "notes.txt", "text/plain", b"hello"),
                "\"notes.txt\" is not an image",
            ),
        ];
        for (body, expected) in cases {
            let response = test::call_service(&app, upload(body).to_request()).await;
            let (status, message) = error_of(response).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(message, expected);
        }
        assert!(fixture.history.recent(HISTORY_LIMIT).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn predict_failure_is_a_server_error() {
        let fixture = Fixture::new(Err("shape mismatch".into()), true);
        let app = test::init_service(fixture.app()).await;

        let req = upload(multipart("image", "leaf.jpg", "image/jpeg", &[1])).to_request();
        let (status, message) = error_of(test::call_service(&app, req).await).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(message.starts_with("Error during prediction"));
    }

    #[actix_web::test]
    async fn diagnosis_passes_answers_and_language() {
        let fixture = Fixture::black_rot();
        let app = test::init_service(fixture.app()).await;

        let req = test::TestRequest::post()
            .uri(REPORT_PATH)
            .set_json(serde_json::json!({
                "disease_name": "Apple___Black_rot",
                "user_context": {"watering_frequency": "Daily"},
                "language": "ta"
            }))
            .to_request();
        let body: ReportResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.report, "# Diagnosis\nApple___Black_rot");

        let seen = fixture.reports.seen.lock().unwrap();
        let (name, answers, language) = &seen[0];
        assert_eq!(name, "Apple___Black_rot");
        assert_eq!(answers.watering_frequency, "Daily");
        assert_eq!(answers.leaf_discoloration, "");
        assert_eq!(*language, Language::Ta);
    }

    #[actix_web::test]
    async fn diagnosis_validates_its_body() {
        let fixture = Fixture::black_rot();
        let app = test::init_service(fixture.app()).await;

        let req = test::TestRequest::post()
            .uri(REPORT_PATH)
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let (status, message) = error_of(test::call_service(&app, req).await).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "Invalid request data");

        for body in [
            serde_json::json!({"user_context": {}}),
            serde_json::json!({"disease_name": "  "}),
        ] {
            let req = test::TestRequest::post()
                .uri(REPORT_PATH)
                .set_json(body)
                .to_request();
            let (status, message) = error_of(test::call_service(&app, req).await).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(message, "Disease name is required for diagnosis");
        }
    }

    #[actix_web::test]
    async fn diagnosis_without_key_is_unavailable() {
        let fixture = Fixture::new(Err("unused".into()), false);
        let app = test::init_service(fixture.app()).await;

        let req = test::TestRequest::post()
            .uri(REPORT_PATH)
            .set_json(serde_json::json!({"disease_name": "Potato___Late_blight"}))
            .to_request();
        let (status, _) = error_of(test::call_service(&app, req).await).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[actix_web::test]
    async fn history_lists_recorded_predictions() {
        let fixture = Fixture::black_rot();
        fixture
            .history
            .record(NewPrediction {
                image: vec![1, 2, 3],
                file_name: "corn.jpg".into(),
                mime_type: "image/jpeg".into(),
                predicted_class_name: "Corn_(maize)___healthy".into(),
                confidence: 99.0,
            })
            .await
            .unwrap();
        let app = test::init_service(fixture.app()).await;

        let req = test::TestRequest::get().uri(HISTORY_PATH).to_request();
        let body: HistoryResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.history.len(), 1);
        assert_eq!(body.history[0].predicted_class_name, "Corn_(maize)___healthy");
    }

    #[actix_web::test]
    async fn language_endpoints() {
        let fixture = Fixture::black_rot();
        let app = test::init_service(fixture.app()).await;

        let req = test::TestRequest::get().uri(LANGUAGES_PATH).to_request();
        let options: Vec<LanguageOption> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(options.len(), 6);
        assert_eq!(options[0].code, "en");

        let req = test::TestRequest::get()
            .uri(DETECT_LANGUAGE_PATH)
            .insert_header(("accept-language", "bn-IN,bn;q=0.9,en;q=0.5"))
            .to_request();
        let detected: DetectedLanguage = test::call_and_read_body_json(&app, req).await;
        assert_eq!(detected.detected_language, "bn");

        let req = test::TestRequest::get()
            .uri(&format!("{TRANSLATIONS_PATH}/xx"))
            .to_request();
        let strings: std::collections::HashMap<String, String> =
            test::call_and_read_body_json(&app, req).await;
        assert_eq!(strings.get("analyze").map(String::as_str), Some("Analyze"));
    }

    #[actix_web::test]
    async fn set_language_writes_cookie() {
        let fixture = Fixture::black_rot();
        let app = test::init_service(fixture.app()).await;

        let req = test::TestRequest::post()
            .uri(SET_LANGUAGE_PATH)
            .set_json(LanguageSelection {
                language: "mr".into(),
            })
            .to_request();
        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response
            .response()
            .cookies()
            .find(|c| c.name() == LANGUAGE_COOKIE)
            .unwrap();
        assert_eq!(cookie.value(), "mr");

        let req = test::TestRequest::post()
            .uri(SET_LANGUAGE_PATH)
            .set_json(LanguageSelection {
                language: "kn".into(),
            })
            .to_request();
        let (status, message) = error_of(test::call_service(&app, req).await).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "Unsupported language: kn");
    }
}
