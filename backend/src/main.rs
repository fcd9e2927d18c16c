mod classifier;
mod config;
mod db;
mod error;
mod history;
mod i18n;
mod report;
mod routes;
mod storage;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_sdk_s3::Client as S3Client;
use classifier::Classifier;
use classifier::serving::TfServingClassifier;
use config::{AppConfig, HistoryConfig};
use db::prediction_repository::PredictionRepository;
use history::{AwsHistory, HistoryStore, InMemoryHistory};
use i18n::{LanguageDetector, TranslationManager};
use report::ReportGenerator;
use report::gemini::GeminiReportGenerator;
use routes::{configure_routes, configure_static};
use std::sync::Arc;
use storage::s3_service::S3Service;

fn startup_error(what: &str, e: impl std::fmt::Display) -> std::io::Error {
    log::error!("{}: {}", what, e);
    std::io::Error::other(format!("{what}: {e}"))
}

async fn build_history(config: &HistoryConfig) -> Arc<dyn HistoryStore> {
    let Some(table) = config.predictions_table.clone() else {
        log::warn!(
            "DYNAMODB_PREDICTIONS_TABLE is not set; prediction history is kept in memory only"
        );
        return Arc::new(InMemoryHistory::default());
    };

    let aws_config = aws_config::defaults(BehaviorVersion::latest()).load().await;
    let db_repo = PredictionRepository::new(DynamoDbClient::new(&aws_config), table.clone());
    let s3_service = config.images_bucket.clone().map(|bucket| {
        log::info!("Storing analysed images in s3://{}", bucket);
        S3Service::new(S3Client::new(&aws_config), bucket)
    });
    log::info!("Recording prediction history in DynamoDB table '{}'", table);
    Arc::new(AwsHistory::new(db_repo, s3_service))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(|e| startup_error("Invalid configuration", e))?;

    let classifier: Arc<dyn Classifier> = Arc::new(
        TfServingClassifier::new(&config.model)
            .map_err(|e| startup_error("Failed to set up the classifier", e))?,
    );
    let reports: Arc<dyn ReportGenerator> = Arc::new(
        GeminiReportGenerator::new(&config.gemini)
            .map_err(|e| startup_error("Failed to set up the report service", e))?,
    );
    let translations = web::Data::new(
        TranslationManager::new(&config.translations_dir)
            .map_err(|e| startup_error("Failed to load translations", e))?,
    );
    let detector = web::Data::new(
        LanguageDetector::new(&config.geolocation)
            .map_err(|e| startup_error("Failed to set up language detection", e))?,
    );
    let history = build_history(&config.history).await;

    let frontend_dir = config.frontend_dir.display().to_string();
    if !config.frontend_dir.exists() {
        log::warn!("Frontend directory {} does not exist", frontend_dir);
    }

    let bind_address = format!("0.0.0.0:{}", config.port);
    log::info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::ACCEPT_LANGUAGE,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .app_data(web::Data::from(classifier.clone()))
            .app_data(web::Data::from(reports.clone()))
            .app_data(web::Data::from(history.clone()))
            .app_data(translations.clone())
            .app_data(detector.clone())
            .configure(configure_routes)
            .configure(|cfg| configure_static(cfg, frontend_dir.clone()))
    })
    .bind(&bind_address)?
    .run()
    .await
}
