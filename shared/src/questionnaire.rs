//! The ten-question symptom and conditions questionnaire.

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, EnumIter, EnumString, IntoStaticStr};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, AsRefStr, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum Question {
    LeafDiscoloration,
    WiltingDropping,
    RecentWeather,
    TemperatureCondition,
    RecentFertilizer,
    PreviousPesticide,
    InsectsObserved,
    EvidenceOfDamage,
    WateringFrequency,
    PlantAgeGrowth,
}

/// A selectable answer. `value` is what gets sent to the report service,
/// `key` names its translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOption {
    pub key: &'static str,
    pub value: &'static str,
}

const fn opt(key: &'static str, value: &'static str) -> AnswerOption {
    AnswerOption { key, value }
}

const NONE: AnswerOption = opt("opt_none", "None");

impl Question {
    /// Wire key, e.g. `leaf_discoloration`.
    pub fn key(self) -> &'static str {
        self.into()
    }

    /// Translation key of the question text.
    pub fn label_key(self) -> String {
        format!("q_{}", self.key())
    }

    pub fn all() -> impl Iterator<Item = Question> {
        Question::iter()
    }

    pub fn options(self) -> &'static [AnswerOption] {
        match self {
            Question::LeafDiscoloration => const {
                &[
                    opt("opt_yellowing", "Yellowing"),
                    opt("opt_brown_spots", "Brown spots"),
                    opt("opt_black_spots", "Black spots"),
                    opt("opt_white_powder", "White powdery coating"),
                    NONE,
                ]
            },
            Question::WiltingDropping => const {
                &[
                    opt("opt_wilting", "Wilting"),
                    opt("opt_leaf_drop", "Leaves dropping"),
                    opt("opt_wilting_and_drop", "Wilting and leaves dropping"),
                    NONE,
                ]
            },
            Question::RecentWeather => const {
                &[
                    opt("opt_heavy_rain", "Heavy rain"),
                    opt("opt_high_humidity", "High humidity"),
                    opt("opt_dry_spell", "Dry spell"),
                    opt("opt_normal_weather", "Normal"),
                ]
            },
            Question::TemperatureCondition => const {
                &[
                    opt("opt_hot", "Hot"),
                    opt("opt_mild", "Mild"),
                    opt("opt_cold", "Cold"),
                ]
            },
            Question::RecentFertilizer => const {
                &[
                    opt("opt_chemical_fertilizer", "Chemical fertilizer"),
                    opt("opt_organic_manure", "Organic manure or compost"),
                    NONE,
                ]
            },
            Question::PreviousPesticide => const {
                &[
                    opt("opt_chemical_pesticide", "Chemical pesticide"),
                    opt("opt_organic_pesticide", "Organic pesticide"),
                    NONE,
                ]
            },
            Question::InsectsObserved => const {
                &[
                    opt("opt_aphids", "Aphids"),
                    opt("opt_caterpillars", "Caterpillars"),
                    opt("opt_mites", "Mites"),
                    opt("opt_whiteflies", "Whiteflies"),
                    NONE,
                ]
            },
            Question::EvidenceOfDamage => const {
                &[
                    opt("opt_holes", "Holes in leaves"),
                    opt("opt_webbing", "Webbing"),
                    opt("opt_sticky_residue", "Sticky residue"),
                    NONE,
                ]
            },
            Question::WateringFrequency => const {
                &[
                    opt("opt_daily", "Daily"),
                    opt("opt_few_times_week", "A few times a week"),
                    opt("opt_weekly", "Weekly"),
                    opt("opt_irregular", "Irregular"),
                ]
            },
            Question::PlantAgeGrowth => const {
                &[
                    opt("opt_seedling", "Seedling"),
                    opt("opt_vegetative", "Vegetative growth"),
                    opt("opt_flowering", "Flowering"),
                    opt("opt_fruiting", "Fruiting"),
                ]
            },
        }
    }
}

/// One selected option per question. Unanswered questions hold an empty
/// string and are still serialized.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionnaireAnswers {
    pub leaf_discoloration: String,
    pub wilting_dropping: String,
    pub recent_weather: String,
    pub temperature_condition: String,
    pub recent_fertilizer: String,
    pub previous_pesticide: String,
    pub insects_observed: String,
    pub evidence_of_damage: String,
    pub watering_frequency: String,
    pub plant_age_growth: String,
}

impl QuestionnaireAnswers {
    fn slot(&mut self, question: Question) -> &mut String {
        match question {
            Question::LeafDiscoloration => &mut self.leaf_discoloration,
            Question::WiltingDropping => &mut self.wilting_dropping,
            Question::RecentWeather => &mut self.recent_weather,
            Question::TemperatureCondition => &mut self.temperature_condition,
            Question::RecentFertilizer => &mut self.recent_fertilizer,
            Question::PreviousPesticide => &mut self.previous_pesticide,
            Question::InsectsObserved => &mut self.insects_observed,
            Question::EvidenceOfDamage => &mut self.evidence_of_damage,
            Question::WateringFrequency => &mut self.watering_frequency,
            Question::PlantAgeGrowth => &mut self.plant_age_growth,
        }
    }

    pub fn get(&self, question: Question) -> &str {
        match question {
            Question::LeafDiscoloration => &self.leaf_discoloration,
            Question::WiltingDropping => &self.wilting_dropping,
            Question::RecentWeather => &self.recent_weather,
            Question::TemperatureCondition => &self.temperature_condition,
            Question::RecentFertilizer => &self.recent_fertilizer,
            Question::PreviousPesticide => &self.previous_pesticide,
            Question::InsectsObserved => &self.insects_observed,
            Question::EvidenceOfDamage => &self.evidence_of_damage,
            Question::WateringFrequency => &self.watering_frequency,
            Question::PlantAgeGrowth => &self.plant_age_growth,
        }
    }

    pub fn set(&mut self, question: Question, value: impl Into<String>) {
        *self.slot(question) = value.into();
    }

    pub fn iter(&self) -> impl Iterator<Item = (Question, &str)> {
        Question::all().map(move |question| (question, self.get(question)))
    }

    pub fn is_blank(&self) -> bool {
        self.iter().all(|(_, value)| value.trim().is_empty())
    }
}
