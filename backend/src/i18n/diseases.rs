//! Localised crop and disease names for the prediction result.

use std::collections::HashMap;

use shared::Language;
use shared::render::display_label;

type Table = Vec<(&'static str, &'static str)>;

lazy_static::lazy_static! {
    static ref DISEASE_NAMES: HashMap<Language, Table> = {
        let mut tables = HashMap::new();
        tables.insert(Language::Hi, vec![
            ("Apple", "सेब"),
            ("Blueberry", "ब्लूबेरी"),
            ("Cherry", "चेरी"),
            ("Corn", "मक्का"),
            ("Grape", "अंगूर"),
            ("Orange", "संतरा"),
            ("Peach", "आड़ू"),
            ("Pepper", "मिर्च"),
            ("Potato", "आलू"),
            ("Raspberry", "रास्पबेरी"),
            ("Soybean", "सोयाबीन"),
            ("Squash", "स्क्वैश"),
            ("Strawberry", "स्ट्रॉबेरी"),
            ("Tomato", "टमाटर"),
            ("healthy", "स्वस्थ"),
            ("Black rot", "काली सड़न"),
            ("Cedar rust", "देवदार जंग"),
            ("Scab", "पपड़ी"),
            ("Powdery mildew", "पाउडरी मिल्ड्यू"),
            ("Leaf blight", "पत्ती झुलसा"),
            ("Esca", "एस्का"),
            ("Haunglongbing", "हुआंगलांगबिंग"),
            ("Bacterial spot", "बैक्टीरियल स्पॉट"),
            ("Leaf scorch", "पत्ती स्कॉर्च"),
            ("Early blight", "शुरुआती झुलसा"),
            ("Late blight", "देर से झुलसा"),
            ("Septoria leaf spot", "सेप्टोरिया पत्ती स्पॉट"),
            ("Target spot", "लक्ष्य स्पॉट"),
            ("Mosaic virus", "मोजेक वायरस"),
            ("Yellow leaf curl", "पीली पत्ती कर्ल"),
            ("Spider mites", "मकड़ी के घुन"),
        ]);
        tables.insert(Language::Mr, vec![
            ("Apple", "सफरचंद"),
            ("Blueberry", "नील बेरी"),
            ("Cherry", "चेरी"),
            ("Corn", "मक्का"),
            ("Grape", "द्राक्ष"),
            ("Orange", "नारंगी"),
            ("Peach", "आडू"),
            ("Pepper", "मिरची"),
            ("Potato", "बटाटा"),
            ("Raspberry", "रसभरी"),
            ("Soybean", "सोयाबीन"),
            ("Squash", "स्क्वाश"),
            ("Strawberry", "स्ट्रॉबेरी"),
            ("Tomato", "टोमॅटो"),
            ("healthy", "निरोगी"),
            ("Black rot", "काळी कुजळी"),
            ("Cedar rust", "देवदार गंजक"),
            ("Scab", "कोड"),
            ("Powdery mildew", "शेताळ"),
            ("Leaf blight", "पानांचा झुलसा"),
            ("Esca", "एस्का"),
        ]);
        tables.insert(Language::Ta, vec![
            ("Apple", "ஆப்பிள்"),
            ("Blueberry", "ப்ளூபெரி"),
            ("Cherry", "சேரி"),
            ("Corn", "சோளம்"),
            ("Grape", "திராட்சை"),
            ("Orange", "ஆரஞ்சு"),
            ("Peach", "பீச்"),
            ("Pepper", "மிளகு"),
            ("Potato", "உருளைக்கிழங்கு"),
            ("Raspberry", "ரேஸ்பெரி"),
            ("Soybean", "சோயாபீன்"),
            ("Squash", "கோல்"),
            ("Strawberry", "நீதிக்கொட்டை"),
            ("Tomato", "தக்காளி"),
            ("healthy", "ஆரோக்கியமான"),
            ("Black rot", "கருப்பு அழுகல்"),
            ("Cedar rust", "தேவதாரு அரிப்பு"),
        ]);
        tables.insert(Language::Te, vec![
            ("Apple", "ఆపిల్"),
            ("Blueberry", "బ్లూబెర్రీ"),
            ("Cherry", "చెర్రీ"),
            ("Corn", "మకా"),
            ("Grape", "ద్రాక్ష"),
            ("Orange", "నారింజ"),
            ("Peach", "పీచ్"),
            ("Pepper", "మిరిపప్పు"),
            ("Potato", "బంతులు"),
            ("Raspberry", "రాస్‌బెర్రీ"),
            ("Soybean", "సోయాబీన్"),
            ("Squash", "స్కాష్"),
            ("Strawberry", "స్ట్రాబెర్రీ"),
            ("Tomato", "టమాటా"),
            ("healthy", "ఆరోగ్యకరమైన"),
        ]);
        tables.insert(Language::Bn, vec![
            ("Apple", "আপেল"),
            ("Blueberry", "ব্লুবেরি"),
            ("Cherry", "চেরি"),
            ("Corn", "ভুট্টা"),
            ("Grape", "আঙ্গুর"),
            ("Orange", "কমলা"),
            ("Peach", "পীচ"),
            ("Pepper", "মরিচ"),
            ("Potato", "আলু"),
            ("Raspberry", "রাস্পবেরি"),
            ("Soybean", "সয়াবিন"),
            ("Squash", "স্কোয়াশ"),
            ("Strawberry", "স্ট্রবেরি"),
            ("Tomato", "টমেটো"),
            ("healthy", "সুস্থ"),
        ]);
        // Multi-word phrases must win over the single words inside them.
        for table in tables.values_mut() {
            table.sort_by_key(|(english, _)| std::cmp::Reverse(english.len()));
        }
        tables
    };
}

/// Localised form of a class name such as `Tomato___Late_blight`, or `None`
/// when the language is English or nothing in the name is known.
pub fn translate_disease_name(class_name: &str, language: Language) -> Option<String> {
    let table = DISEASE_NAMES.get(&language)?;
    let readable = display_label(class_name);

    if let Some((_, exact)) = table
        .iter()
        .find(|(english, _)| english.eq_ignore_ascii_case(&readable))
    {
        return Some(exact.to_string());
    }

    let mut translated = readable.clone();
    for (english, local) in table {
        translated = replace_words(&translated, english, local);
    }
    (translated != readable).then_some(translated)
}

/// Case-insensitive whole-word replacement of an ASCII phrase.
fn replace_words(haystack: &str, needle: &str, replacement: &str) -> String {
    let lowered_needle = needle.to_ascii_lowercase();
    let mut out = String::with_capacity(haystack.len());
    let mut rest = haystack;

    // ASCII lowercasing keeps byte offsets aligned with the original.
    while let Some(start) = rest.to_ascii_lowercase().find(&lowered_needle) {
        let end = start + needle.len();
        let before_ok = rest[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric());
        let after_ok = rest[end..]
            .chars()
            .next()
            .is_none_or(|c| !c.is_alphanumeric());

        if before_ok && after_ok {
            out.push_str(&rest[..start]);
            out.push_str(replacement);
        } else {
            out.push_str(&rest[..end]);
        }
        rest = &rest[end..];
    }
    out.push_str(rest);
    out
}
