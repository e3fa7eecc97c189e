//! Language registry: single source of truth for every language the bot can detect.
//!
//! The registry is a process-wide, immutable table initialized lazily with
//! `OnceLock`. Detection engines, channel selection and the language-selection
//! prompt all read from it.

use std::sync::OnceLock;

/// Configuration for a detectable language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// ISO 639-3 language code (e.g., "eng", "fra", "zho")
    pub code: &'static str,

    /// English name of the language, as shown to users and sent to the translator
    pub name: &'static str,

    /// Whether this language belongs to the small high-frequency set used as
    /// the low-confidence fallback during detection
    pub is_common: bool,
}

/// Global language registry singleton.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

/// Global registry instance (initialized lazily)
static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Get a language configuration by its ISO 639-3 code.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// Get a language configuration by its English name.
    ///
    /// Matching ignores case and surrounding whitespace, so `" french "` and
    /// `"French"` resolve to the same language.
    pub fn get_by_name(&self, name: &str) -> Option<&LanguageConfig> {
        let wanted = name.trim().to_lowercase();
        if wanted.is_empty() {
            return None;
        }
        self.languages
            .iter()
            .find(|lang| lang.name.to_lowercase() == wanted)
    }

    /// Get all languages, in registry order.
    pub fn list_all(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().collect()
    }

    /// Get the common-language subset used by the detection fallback.
    pub fn list_common(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().filter(|lang| lang.is_common).collect()
    }
}

fn lang(code: &'static str, name: &'static str, is_common: bool) -> LanguageConfig {
    LanguageConfig {
        code,
        name,
        is_common,
    }
}

/// Default language definitions.
///
/// Codes follow the ISO 639-3 identifiers used by the detection engine.
fn default_languages() -> Vec<LanguageConfig> {
    vec![
        lang("eng", "English", true),
        lang("zho", "Chinese", true),
        lang("deu", "German", true),
        lang("spa", "Spanish", true),
        lang("jpn", "Japanese", true),
        lang("fra", "French", true),
        lang("afr", "Afrikaans", false),
        lang("ara", "Arabic", false),
        lang("aze", "Azerbaijani", false),
        lang("bel", "Belarusian", false),
        lang("ben", "Bengali", false),
        lang("bul", "Bulgarian", false),
        lang("cat", "Catalan", false),
        lang("ces", "Czech", false),
        lang("dan", "Danish", false),
        lang("ell", "Greek", false),
        lang("est", "Estonian", false),
        lang("fin", "Finnish", false),
        lang("heb", "Hebrew", false),
        lang("hin", "Hindi", false),
        lang("hrv", "Croatian", false),
        lang("hun", "Hungarian", false),
        lang("ind", "Indonesian", false),
        lang("ita", "Italian", false),
        lang("kat", "Georgian", false),
        lang("kor", "Korean", false),
        lang("lav", "Latvian", false),
        lang("lit", "Lithuanian", false),
        lang("mkd", "Macedonian", false),
        lang("nld", "Dutch", false),
        lang("nob", "Norwegian", false),
        lang("fas", "Persian", false),
        lang("pol", "Polish", false),
        lang("por", "Portuguese", false),
        lang("ron", "Romanian", false),
        lang("rus", "Russian", false),
        lang("slk", "Slovak", false),
        lang("slv", "Slovenian", false),
        lang("srp", "Serbian", false),
        lang("swe", "Swedish", false),
        lang("tam", "Tamil", false),
        lang("tel", "Telugu", false),
        lang("tgl", "Tagalog", false),
        lang("tha", "Thai", false),
        lang("tur", "Turkish", false),
        lang("ukr", "Ukrainian", false),
        lang("urd", "Urdu", false),
        lang("vie", "Vietnamese", false),
    ]
}
