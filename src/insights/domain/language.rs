//! Languages supported by the insights pipeline.

use serde::Serialize;

/// A language the pipeline can extract insights in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InsightsLanguage {
    /// Identifier understood by the OCR engine.
    pub id: &'static str,
    /// ISO 639-3 code.
    pub iso6393: &'static str,
    /// Display name.
    pub name: &'static str,
}

const fn language(id: &'static str, iso6393: &'static str, name: &'static str) -> InsightsLanguage {
    InsightsLanguage { id, iso6393, name }
}

/// Supported languages in display order.
pub const LANGUAGES: [InsightsLanguage; 17] = [
    language("ara", "ara", "Arabic"),
    language("chi_sim", "zho", "Chinese Simplified"),
    language("chi_tra", "zho", "Chinese Traditional"),
    language("deu", "deu", "German"),
    language("eng", "eng", "English"),
    language("fra", "fra", "French"),
    language("hin", "hin", "Hindi"),
    language("ita", "ita", "Italian"),
    language("jpn", "jpn", "Japanese"),
    language("nld", "nld", "Dutch"),
    language("por", "por", "Portuguese"),
    language("rus", "rus", "Russian"),
    language("spa", "spa", "Spanish"),
    language("swe", "swe", "Swedish"),
    language("nor", "nor", "Norwegian"),
    language("fin", "fin", "Finnish"),
    language("dan", "dan", "Danish"),
];

/// Looks up a supported language by id.
#[must_use]
pub fn find_language(id: &str) -> Option<&'static InsightsLanguage> {
    LANGUAGES.iter().find(|language| language.id == id)
}
