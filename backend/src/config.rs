use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

const DEFAULT_PORT: u16 = 8081;
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_GEOLOCATION_URL: &str = "http://ip-api.com/json";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub frontend_dir: PathBuf,
    pub translations_dir: PathBuf,
    pub model: ModelConfig,
    pub gemini: GeminiConfig,
    pub history: HistoryConfig,
    pub geolocation: GeolocationConfig,
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default)]
pub struct HistoryConfig {
    pub predictions_table: Option<String>,
    pub images_bucket: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GeolocationConfig {
    pub enabled: bool,
    pub endpoint: String,
}

/// Contents of `config/model.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    pub serving_url: String,
    pub class_indices: PathBuf,
    pub image: ImageConfig,
    #[serde(default = "default_model_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageConfig {
    /// `[height, width]` expected by the model.
    pub size: [u32; 2],
    #[serde(default = "default_rescale")]
    pub rescale: f32,
    #[serde(default)]
    pub resize_method: ResizeMethod,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResizeMethod {
    #[default]
    Nearest,
    Bilinear,
}

fn default_model_timeout() -> u64 {
    30
}

fn default_rescale() -> f32 {
    1.0 / 255.0
}

impl ModelConfig {
    /// Reads the YAML file; a relative `class_indices` path is resolved
    /// against the file's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut config: ModelConfig =
            serde_yaml::from_str(&raw).map_err(|source| ConfigError::Yaml {
                path: path.display().to_string(),
                source,
            })?;
        if config.class_indices.is_relative() {
            if let Some(dir) = path.parent() {
                config.class_indices = dir.join(&config.class_indices);
            }
        }
        Ok(config)
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from a variable lookup. Empty values count
    /// as unset.
    ///
    /// Relative defaults (`translations/`, `../frontend/dist`,
    /// `../config/model.yaml`) are resolved against `APP_ROOT`, then
    /// `CARGO_MANIFEST_DIR` (set by `cargo run`), then the directory holding
    /// the executable. They never depend on the working directory.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let base_dir = var("APP_ROOT")
            .or_else(|| var("CARGO_MANIFEST_DIR"))
            .map(PathBuf::from)
            .unwrap_or_else(executable_dir);

        let port = match var("PORT") {
            Some(raw) => raw.parse().map_err(|e| ConfigError::Invalid {
                key: "PORT",
                reason: format!("{raw:?}: {e}"),
            })?,
            None => DEFAULT_PORT,
        };

        let frontend_dir = var("FRONTEND_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| base_dir.join("../frontend/dist"));
        let translations_dir = var("TRANSLATIONS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| base_dir.join("translations"));
        let model_config_path = var("MODEL_CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| base_dir.join("../config/model.yaml"));

        let mut model = ModelConfig::load(&model_config_path)?;
        if let Some(serving_url) = var("CLASSIFIER_URL") {
            model.serving_url = serving_url;
        }
        validate_url("CLASSIFIER_URL", &model.serving_url)?;

        let gemini = GeminiConfig {
            api_key: var("GEMINI_API_KEY"),
            model: var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            base_url: var("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            timeout_secs: parse_or("GEMINI_TIMEOUT_SECS", var("GEMINI_TIMEOUT_SECS"), 60)?,
        };
        validate_url("GEMINI_BASE_URL", &gemini.base_url)?;

        let geolocation = GeolocationConfig {
            enabled: parse_or("GEOLOCATION_ENABLED", var("GEOLOCATION_ENABLED"), true)?,
            endpoint: var("GEOLOCATION_URL")
                .unwrap_or_else(|| DEFAULT_GEOLOCATION_URL.to_string()),
        };

        let history = HistoryConfig {
            predictions_table: var("DYNAMODB_PREDICTIONS_TABLE"),
            images_bucket: var("S3_BUCKET_NAME"),
        };

        Ok(Self {
            port,
            frontend_dir,
            translations_dir,
            model,
            gemini,
            history,
            geolocation,
        })
    }
}

fn executable_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: format!("{raw:?}: {e}"),
        }),
        None => Ok(default),
    }
}

fn validate_url(key: &'static str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value).map_err(|e| ConfigError::Invalid {
        key,
        reason: format!("{value:?}: {e}"),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::Invalid {
            key,
            reason: format!("unsupported scheme {other:?}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn workspace_model_config() -> String {
        format!("{}/../config/model.yaml", env!("CARGO_MANIFEST_DIR"))
    }

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn model_yaml_resolves_class_indices_next_to_it() {
        let config = ModelConfig::load(Path::new(&workspace_model_config())).unwrap();
        assert_eq!(config.image.size, [128, 128]);
        assert!((config.image.rescale - 1.0 / 255.0).abs() < f32::EPSILON);
        assert!(config.class_indices.ends_with("class_indices.json"));
        assert!(config.class_indices.exists());
    }

    #[test]
    fn defaults_apply_when_variables_are_missing() {
        let config = AppConfig::from_lookup(lookup(&[(
            "MODEL_CONFIG_PATH",
            &workspace_model_config(),
        )]))
        .unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.gemini.model, DEFAULT_GEMINI_MODEL);
        assert!(config.gemini.api_key.is_none());
        assert!(config.geolocation.enabled);
        assert!(config.history.predictions_table.is_none());
    }

    #[test]
    fn overrides_are_honoured() {
        let config = AppConfig::from_lookup(lookup(&[
            ("MODEL_CONFIG_PATH", &workspace_model_config()),
            ("PORT", "9000"),
            ("CLASSIFIER_URL", "http://tf-serving:8501/v1/models/leaf:predict"),
            ("GEMINI_API_KEY", "secret"),
            ("GEOLOCATION_ENABLED", "false"),
            ("DYNAMODB_PREDICTIONS_TABLE", "predictions"),
            ("S3_BUCKET_NAME", ""),
        ]))
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(
            config.model.serving_url,
            "http://tf-serving:8501/v1/models/leaf:predict"
        );
        assert_eq!(config.gemini.api_key.as_deref(), Some("secret"));
        assert!(!config.geolocation.enabled);
        assert_eq!(config.history.predictions_table.as_deref(), Some("predictions"));
        assert!(config.history.images_bucket.is_none());
    }

    #[test]
    fn app_root_anchors_the_default_paths() {
        let root = env!("CARGO_MANIFEST_DIR");
        let config = AppConfig::from_lookup(lookup(&[("APP_ROOT", root)])).unwrap();
        assert_eq!(config.translations_dir, Path::new(root).join("translations"));
        assert_eq!(config.frontend_dir, Path::new(root).join("../frontend/dist"));
        assert_eq!(config.model.image.size, [128, 128]);
    }

    #[test]
    fn without_a_root_paths_sit_next_to_the_executable() {
        let config = AppConfig::from_lookup(lookup(&[(
            "MODEL_CONFIG_PATH",
            &workspace_model_config(),
        )]))
        .unwrap();
        assert_eq!(config.translations_dir, executable_dir().join("translations"));
        assert!(config.frontend_dir.is_absolute());
    }

    #[test]
    fn bad_values_are_reported_with_their_key() {
        let err = AppConfig::from_lookup(lookup(&[
            ("MODEL_CONFIG_PATH", &workspace_model_config()),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));

        let err = AppConfig::from_lookup(lookup(&[
            ("MODEL_CONFIG_PATH", &workspace_model_config()),
            ("CLASSIFIER_URL", "ftp://models/leaf"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "CLASSIFIER_URL", .. }));
    }

    #[test]
    fn missing_model_file_is_an_io_error() {
        let err = AppConfig::from_lookup(lookup(&[("MODEL_CONFIG_PATH", "/nonexistent/model.yaml")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
