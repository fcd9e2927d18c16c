use shared::{Language, Question, QuestionnaireAnswers};

pub const NOT_SPECIFIED: &str = "Not specified.";

const GROUPS: [(&str, &[(Question, &str)]); 5] = [
    (
        "Plant Symptoms",
        &[
            (Question::LeafDiscoloration, "Leaf discoloration observed"),
            (Question::WiltingDropping, "Wilting or dropping"),
        ],
    ),
    (
        "Environmental Conditions",
        &[
            (Question::RecentWeather, "Recent weather"),
            (Question::TemperatureCondition, "Temperature condition"),
        ],
    ),
    (
        "Treatment History",
        &[
            (Question::RecentFertilizer, "Recent fertilizer application"),
            (Question::PreviousPesticide, "Previous pesticide use"),
        ],
    ),
    (
        "Pest Observations",
        &[
            (Question::InsectsObserved, "Insects observed"),
            (Question::EvidenceOfDamage, "Evidence of pest damage"),
        ],
    ),
    (
        "Plant Management",
        &[
            (Question::WateringFrequency, "Watering frequency"),
            (Question::PlantAgeGrowth, "Plant age/growth stage"),
        ],
    ),
];

pub const SECTIONS: [&str; 5] = [
    "Integrated Diagnosis",
    "Immediate Action Plan (Organic)",
    "Immediate Action Plan (Chemical)",
    "Long-Term Prevention Strategy",
    "Local Agricultural Support (India)",
];

fn answer_or_default(answers: &QuestionnaireAnswers, question: Question) -> &str {
    let value = answers.get(question).trim();
    if value.is_empty() { NOT_SPECIFIED } else { value }
}

/// Builds the agronomist prompt sent to the report model.
pub fn build_prompt(
    disease_name: &str,
    answers: &QuestionnaireAnswers,
    language: Language,
) -> String {
    let mut prompt = String::from(
        "Act as an expert agronomist and plant pathologist for a user in India.\n\n",
    );

    prompt.push_str("**Primary Diagnosis from Image Analysis:**\n");
    prompt.push_str(&format!(
        "The image analysis model has identified the plant disease as: \"{}\".\n\n",
        disease_name.replace('_', " ")
    ));

    prompt.push_str("**Additional Context from the User (Detailed Questionnaire):**\n");
    for (group, questions) in GROUPS {
        prompt.push_str(&format!("- {group}:\n"));
        for (question, label) in questions {
            prompt.push_str(&format!(
                "    - {label}: \"{}\"\n",
                answer_or_default(answers, *question)
            ));
        }
    }

    prompt.push_str(
        "\n**Your Task:**\nBased on all the information above, provide a comprehensive \
         and actionable report. Structure your response with the following sections \
         using clear markdown:\n\n",
    );
    for (number, section) in SECTIONS.iter().enumerate() {
        prompt.push_str(&format!("{}. **{section}**\n", number + 1));
    }

    prompt.push_str(&format!(
        "\nWrite the entire report in {}.\n",
        language.english_name()
    ));
    prompt
}
