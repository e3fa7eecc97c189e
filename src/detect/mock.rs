//! Deterministic keyword-based detection engine for tests.
//!
//! Whole-word matches against a fixed vocabulary stand in for a statistical
//! model, so router and registry behaviour can be tested without depending
//! on how a real engine scores short phrases.
//!
//! # Example
//!
//! ```ignore
//! let builder = KeywordBuilder::new()
//!     .word("hello", Language::ENGLISH)
//!     .word("bonjour", Language::FRENCH);
//! let engine = builder.build(&[Language::ENGLISH, Language::FRENCH]);
//! assert_eq!(engine.detect_language_of("Bonjour!"), Some(Language::FRENCH));
//! ```

use super::{DetectionEngine, EngineBuilder};
use crate::i18n::Language;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Builds [`KeywordEngine`]s sharing one vocabulary.
#[derive(Debug, Default)]
pub struct KeywordBuilder {
    vocabulary: HashMap<String, Language>,
    builds: AtomicUsize,
}

impl KeywordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate a lowercase word with a language.
    pub fn word(mut self, word: &str, language: Language) -> Self {
        self.vocabulary.insert(word.to_lowercase(), language);
        self
    }

    /// Number of engines built so far.
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }
}

impl EngineBuilder for KeywordBuilder {
    fn build(&self, languages: &[Language]) -> Arc<dyn DetectionEngine> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        Arc::new(KeywordEngine {
            vocabulary: self.vocabulary.clone(),
            languages: languages.to_vec(),
        })
    }
}

/// Counts vocabulary hits per candidate language.
#[derive(Debug, Clone)]
pub struct KeywordEngine {
    vocabulary: HashMap<String, Language>,
    languages: Vec<Language>,
}

impl KeywordEngine {
    fn hits(&self, text: &str) -> Vec<(Language, usize)> {
        let mut counts: Vec<(Language, usize)> =
            self.languages.iter().map(|lang| (*lang, 0)).collect();

        let words = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(|w| w.to_lowercase());

        for word in words {
            if let Some(language) = self.vocabulary.get(&word) {
                if let Some(slot) = counts.iter_mut().find(|(lang, _)| lang == language) {
                    slot.1 += 1;
                }
            }
        }
        counts
    }
}

impl DetectionEngine for KeywordEngine {
    fn languages(&self) -> &[Language] {
        &self.languages
    }

    fn detect_language_of(&self, text: &str) -> Option<Language> {
        let mut best: Option<(Language, usize)> = None;
        for (language, count) in self.hits(text) {
            if count > 0 && best.map_or(true, |(_, top)| count > top) {
                best = Some((language, count));
            }
        }
        best.map(|(language, _)| language)
    }

    fn compute_language_confidence(&self, text: &str, language: Language) -> f64 {
        self.compute_language_confidence_values(text)
            .into_iter()
            .find(|(lang, _)| *lang == language)
            .map(|(_, confidence)| confidence)
            .unwrap_or(0.0)
    }

    fn compute_language_confidence_values(&self, text: &str) -> Vec<(Language, f64)> {
        let hits = self.hits(text);
        let total: usize = hits.iter().map(|(_, count)| count).sum();
        hits.into_iter()
            .map(|(language, count)| {
                let confidence = if total == 0 {
                    0.0
                } else {
                    count as f64 / total as f64
                };
                (language, confidence)
            })
            .collect()
    }
}
