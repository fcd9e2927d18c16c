use std::collections::HashMap;
use std::rc::Rc;

use gloo_storage::{SessionStorage, Storage};
use shared::Language;

const ENGLISH: &str = include_str!("../../backend/translations/en.json");

fn storage_key(language: Language) -> String {
    format!("cropdoc.translations.{}", language.code())
}

/// UI strings for one language. Lookups fall back to the bundled English
/// table and finally to the key itself, so the page renders before (or
/// without) the translation endpoint.
#[derive(Clone, Debug, PartialEq)]
pub struct Translations {
    strings: Rc<HashMap<String, String>>,
    english: Rc<HashMap<String, String>>,
}

impl Translations {
    pub fn english() -> Self {
        let english: Rc<HashMap<String, String>> =
            Rc::new(serde_json::from_str(ENGLISH).unwrap_or_default());
        Self {
            strings: english.clone(),
            english,
        }
    }

    pub fn with_strings(strings: HashMap<String, String>) -> Self {
        Self {
            strings: Rc::new(strings),
            ..Self::english()
        }
    }

    pub fn get(&self, key: &str) -> String {
        self.strings
            .get(key)
            .or_else(|| self.english.get(key))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    /// Strings saved earlier in this tab.
    pub fn cached(language: Language) -> Option<Self> {
        SessionStorage::get::<HashMap<String, String>>(storage_key(language))
            .ok()
            .map(Self::with_strings)
    }

    pub fn store(&self, language: Language) {
        if let Err(e) = SessionStorage::set(storage_key(language), &*self.strings) {
            log::debug!("Could not cache translations: {}", e);
        }
    }
}

/// Tracks which language the page should end up in. Translation loads
/// finish in any order, so only the latest request may be applied, and a
/// detection result never overrides a language the visitor picked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LanguageRequest {
    latest: Option<Language>,
    chosen: bool,
}

impl LanguageRequest {
    /// Returns false when the visitor has already picked a language.
    pub fn detected(&mut self, language: Language) -> bool {
        if self.chosen {
            return false;
        }
        self.latest = Some(language);
        true
    }

    pub fn chosen(&mut self, language: Language) {
        self.chosen = true;
        self.latest = Some(language);
    }

    pub fn is_current(&self, language: Language) -> bool {
        self.latest == Some(language)
    }
}
