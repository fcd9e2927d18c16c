//! Interface translations, language detection and localised disease names.

pub mod detect;
pub mod diseases;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use shared::Language;

pub use detect::LanguageDetector;
pub use diseases::translate_disease_name;

/// Cookie holding the visitor's chosen language code.
pub const LANGUAGE_COOKIE: &str = "language";

pub type Translations = HashMap<String, String>;

#[derive(Debug, thiserror::Error)]
pub enum TranslationError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Loads `<code>.json` files once and serves them from memory. Every
/// language is overlaid on English, so a key missing from a translation
/// still resolves.
pub struct TranslationManager {
    dir: PathBuf,
    english: Arc<Translations>,
    cache: RwLock<HashMap<Language, Arc<Translations>>>,
}

impl TranslationManager {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, TranslationError> {
        let dir = dir.into();
        let english = Arc::new(read_file(&dir.join("en.json"))?);
        log::info!(
            "Loaded {} English strings from {}",
            english.len(),
            dir.display()
        );
        Ok(Self {
            dir,
            english,
            cache: RwLock::new(HashMap::new()),
        })
    }

    pub fn translations(&self, language: Language) -> Arc<Translations> {
        if language == Language::En {
            return self.english.clone();
        }
        if let Some(hit) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&language)
        {
            return hit.clone();
        }

        let path = self.dir.join(format!("{}.json", language.code()));
        let merged = match read_file(&path) {
            Ok(local) => {
                let mut merged = (*self.english).clone();
                merged.extend(local);
                Arc::new(merged)
            }
            Err(e) => {
                log::warn!("Falling back to English for {}: {}", language.code(), e);
                self.english.clone()
            }
        };

        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(language, merged.clone());
        merged
    }
}

fn read_file(path: &Path) -> Result<Translations, TranslationError> {
    let raw = std::fs::read_to_string(path).map_err(|source| TranslationError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| TranslationError::Json {
        path: path.display().to_string(),
        source,
    })
}
