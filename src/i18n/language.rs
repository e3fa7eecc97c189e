//! Language type: a detectable language validated against the registry.

use crate::i18n::{LanguageConfig, LanguageRegistry};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A validated language.
///
/// Only languages present in the registry can be constructed, so every
/// `Language` value is a known, non-unknown identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Language {
    /// ISO 639-3 language code (e.g., "eng", "fra")
    code: &'static str,
}

impl Language {
    pub const ENGLISH: Language = Language { code: "eng" };
    pub const FRENCH: Language = Language { code: "fra" };
    pub const JAPANESE: Language = Language { code: "jpn" };
    pub const SPANISH: Language = Language { code: "spa" };
    pub const GERMAN: Language = Language { code: "deu" };
    pub const CHINESE: Language = Language { code: "zho" };

    /// Create a Language from its ISO 639-3 code.
    pub fn from_code(code: &str) -> Option<Language> {
        LanguageRegistry::get()
            .get_by_code(code)
            .map(|config| Language { code: config.code })
    }

    /// Create a Language from a human-readable name.
    ///
    /// Matching is case and whitespace insensitive.
    ///
    /// # Example
    /// ```ignore
    /// assert_eq!(Language::from_name(" french "), Some(Language::FRENCH));
    /// ```
    pub fn from_name(name: &str) -> Option<Language> {
        LanguageRegistry::get()
            .get_by_name(name)
            .map(|config| Language { code: config.code })
    }

    /// Every detectable language.
    pub fn all() -> Vec<Language> {
        LanguageRegistry::get()
            .list_all()
            .into_iter()
            .map(|config| Language { code: config.code })
            .collect()
    }

    /// The high-frequency subset used as the detection fallback.
    pub fn common() -> Vec<Language> {
        LanguageRegistry::get()
            .list_common()
            .into_iter()
            .map(|config| Language { code: config.code })
            .collect()
    }

    /// Get the ISO 639-3 language code.
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Get the full language configuration from the registry.
    ///
    /// # Panics
    /// Panics if the code is not in the registry, which cannot happen for a
    /// Language built through `from_code`, `from_name` or the constants.
    pub fn config(&self) -> &'static LanguageConfig {
        LanguageRegistry::get()
            .get_by_code(self.code)
            .expect("Language code should always be valid")
    }

    /// Get the English name of the language.
    pub fn name(&self) -> &'static str {
        self.config().name
    }

    pub fn is_common(&self) -> bool {
        self.config().is_common
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// Persisted as the English name so snapshots stay readable.
impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Language {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Language::from_name(&name)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown language '{}'", name)))
    }
}
