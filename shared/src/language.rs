use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, EnumIter, EnumString, IntoStaticStr};

/// Languages the interface and reports are offered in.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    AsRefStr,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hi,
    Mr,
    Ta,
    Te,
    Bn,
}

impl Language {
    pub fn code(self) -> &'static str {
        self.into()
    }

    /// Name shown in the language picker.
    pub fn native_name(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Hi => "हिन्दी (Hindi)",
            Language::Mr => "मराठी (Marathi)",
            Language::Ta => "தமிழ் (Tamil)",
            Language::Te => "తెలుగు (Telugu)",
            Language::Bn => "বাংলা (Bengali)",
        }
    }

    /// Name used when instructing the report model.
    pub fn english_name(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Hi => "Hindi",
            Language::Mr => "Marathi",
            Language::Ta => "Tamil",
            Language::Te => "Telugu",
            Language::Bn => "Bengali",
        }
    }

    /// Parses a code such as `hi`, `HI` or `hi-IN`; `None` when unsupported.
    pub fn from_code(code: &str) -> Option<Self> {
        let primary = code.trim().split(['-', '_']).next().unwrap_or_default();
        primary.to_ascii_lowercase().parse().ok()
    }

    /// Like [`Language::from_code`], defaulting to English.
    pub fn from_code_or_default(code: &str) -> Self {
        Self::from_code(code).unwrap_or_default()
    }

    pub fn all() -> impl Iterator<Item = Language> {
        Language::iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_region_tagged_codes() {
        assert_eq!(Language::from_code("hi-IN"), Some(Language::Hi));
        assert_eq!(Language::from_code(" TA "), Some(Language::Ta));
        assert_eq!(Language::from_code("kn"), None);
        assert_eq!(Language::from_code(""), None);
    }

    #[test]
    fn codes_round_trip_through_serde() {
        for language in Language::all() {
            let json = serde_json::to_string(&language).unwrap();
            assert_eq!(json, format!("\"{}\"", language.code()));
        }
    }

    #[test]
    fn unsupported_defaults_to_english() {
        assert_eq!(Language::from_code_or_default("fr"), Language::En);
    }
}
