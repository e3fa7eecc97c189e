//! Lingua-based detection engine.
//!
//! Lingua scores every candidate language, which is what the per-channel
//! pair selection needs: both pair members get a real confidence value
//! instead of a single winner.

use super::{DetectionEngine, EngineBuilder};
use crate::i18n::Language;
use lingua::{LanguageDetector, LanguageDetectorBuilder};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tracing::{info, warn};

/// Builds lingua engines.
///
/// Models load lazily on first use unless [`LinguaBuilder::preloaded`] is
/// used, which moves the cost to startup.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinguaBuilder {
    preload: bool,
}

impl LinguaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every candidate's models when the engine is built.
    pub fn preloaded() -> Self {
        Self { preload: true }
    }
}

impl EngineBuilder for LinguaBuilder {
    fn build(&self, languages: &[Language]) -> Arc<dyn DetectionEngine> {
        Arc::new(LinguaEngine::new(languages, self.preload))
    }
}

static LINGUA_BY_CODE: OnceLock<HashMap<String, lingua::Language>> = OnceLock::new();

/// The lingua language for an ISO 639-3 code.
pub fn lingua_language(language: Language) -> Option<lingua::Language> {
    LINGUA_BY_CODE
        .get_or_init(|| {
            lingua::Language::all()
                .into_iter()
                .map(|l| (l.iso_code_639_3().to_string(), l))
                .collect()
        })
        .get(language.code())
        .copied()
}

fn from_lingua(language: lingua::Language) -> Option<Language> {
    Language::from_code(&language.iso_code_639_3().to_string())
}

/// Lingua detector limited to a fixed set of candidate languages.
///
/// Lingua needs at least two languages to choose from; with a single
/// candidate the engine answers with that candidate for any text.
pub struct LinguaEngine {
    detector: Option<LanguageDetector>,
    languages: Vec<Language>,
}

impl LinguaEngine {
    pub fn new(languages: &[Language], preload: bool) -> Self {
        let mut candidates: Vec<lingua::Language> = Vec::with_capacity(languages.len());
        for language in languages {
            match lingua_language(*language) {
                Some(l) if !candidates.contains(&l) => candidates.push(l),
                Some(_) => {}
                None => warn!("{} has no lingua model; it will never be detected", language),
            }
        }

        let detector = if candidates.len() >= 2 {
            info!(
                "Initializing lingua engine with {} candidate languages",
                candidates.len()
            );
            let mut builder = LanguageDetectorBuilder::from_languages(&candidates);
            if preload {
                builder.with_preloaded_language_models();
            }
            Some(builder.build())
        } else {
            None
        };

        Self {
            detector,
            languages: languages.to_vec(),
        }
    }

    fn single(&self) -> Option<Language> {
        self.languages.first().copied()
    }
}

impl DetectionEngine for LinguaEngine {
    fn languages(&self) -> &[Language] {
        &self.languages
    }

    fn detect_language_of(&self, text: &str) -> Option<Language> {
        match &self.detector {
            Some(detector) => detector.detect_language_of(text).and_then(from_lingua),
            None => self.single(),
        }
    }

    fn compute_language_confidence(&self, text: &str, language: Language) -> f64 {
        match (&self.detector, lingua_language(language)) {
            (Some(detector), Some(l)) => detector.compute_language_confidence(text, l),
            (None, _) if self.single() == Some(language) => 1.0,
            _ => 0.0,
        }
    }

    fn compute_language_confidence_values(&self, text: &str) -> Vec<(Language, f64)> {
        match &self.detector {
            Some(detector) => detector
                .compute_language_confidence_values(text)
                .into_iter()
                .filter_map(|(l, confidence)| from_lingua(l).map(|language| (language, confidence)))
                .collect(),
            None => self.single().map(|l| vec![(l, 1.0)]).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::ChannelRegistry;
    use crate::detect::Detector as TwoTierDetector;

    const FRENCH_TEXT: &str =
        "Nous allons au marché ce matin pour acheter des légumes et du pain pour le déjeuner.";

    #[test]
    fn test_every_registry_language_maps_to_lingua() {
        for language in Language::all() {
            let mapped = lingua_language(language);
            assert!(
                mapped.is_some(),
                "{} ({}) has no lingua counterpart",
                language,
                language.code()
            );
            assert_eq!(mapped.and_then(from_lingua), Some(language));
        }
    }

    #[test]
    fn test_detects_short_greetings() {
        let detector = TwoTierDetector::new(Arc::new(LinguaBuilder::new()));
        assert_eq!(detector.detect("Hello"), Some(Language::ENGLISH));
        assert_eq!(detector.detect("Hello, how are you?"), Some(Language::ENGLISH));
        assert_eq!(detector.detect(FRENCH_TEXT), Some(Language::FRENCH));
    }

    #[test]
    fn test_scoped_engine_scores_both_candidates() {
        let engine = LinguaBuilder::new().build(&[Language::ENGLISH, Language::FRENCH]);
        let values = engine.compute_language_confidence_values("Bonjour");

        assert_eq!(values.len(), 2);
        let french = values.iter().find(|(l, _)| *l == Language::FRENCH).unwrap().1;
        let english = values.iter().find(|(l, _)| *l == Language::ENGLISH).unwrap().1;
        assert!(french > english, "French {} vs English {}", french, english);
    }

    #[test]
    fn test_channel_pair_selects_french() {
        let mut registry = ChannelRegistry::new(Arc::new(LinguaBuilder::new()));
        registry.select("C1", "English", "French").unwrap();
        assert_eq!(
            registry.select_language_of("C1", "Bonjour").unwrap(),
            Language::FRENCH
        );
        assert_eq!(
            registry.select_language_of("C1", "Hello, how are you?").unwrap(),
            Language::ENGLISH
        );
    }

    #[test]
    fn test_single_candidate_does_not_panic() {
        let engine = LinguaEngine::new(&[Language::GERMAN, Language::GERMAN], false);
        assert_eq!(engine.detect_language_of("anything"), Some(Language::GERMAN));
        assert_eq!(
            engine.compute_language_confidence_values("anything"),
            vec![(Language::GERMAN, 1.0)]
        );
        assert_eq!(engine.compute_language_confidence("anything", Language::FRENCH), 0.0);
    }
}
