//! Two-tier language detection over a pluggable engine.
//!
//! The detector holds two engines built once at startup: one over every
//! registry language and one over the common subset. Short chat messages
//! often defeat the full engine; when its confidence falls below the
//! threshold, the common-language engine gets the final word.
//!
//! Channels with a configured pair use [`Detector::build_scoped`] to get an
//! engine that only ever chooses between the two selected languages.

pub mod mock;
mod lingua_engine;

pub use lingua_engine::{LinguaBuilder, LinguaEngine};

use crate::i18n::Language;
use regex::Regex;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Default minimum confidence for trusting the all-languages engine
pub const DEFAULT_DETECTION_THRESHOLD: f64 = 0.5;

/// A language identification engine restricted to a fixed candidate set.
pub trait DetectionEngine: Send + Sync {
    /// The candidate languages this engine chooses between.
    fn languages(&self) -> &[Language];

    /// Most likely language of `text`, or `None` if nothing can be detected.
    fn detect_language_of(&self, text: &str) -> Option<Language>;

    /// Confidence in [0, 1] that `text` is written in `language`.
    fn compute_language_confidence(&self, text: &str, language: Language) -> f64;

    /// Confidence for every candidate language.
    ///
    /// Callers must not rely on the order of the returned values.
    fn compute_language_confidence_values(&self, text: &str) -> Vec<(Language, f64)>;
}

/// Builds engines for a given candidate set.
///
/// Building is expensive; callers keep the result instead of rebuilding per call.
pub trait EngineBuilder: Send + Sync {
    fn build(&self, languages: &[Language]) -> Arc<dyn DetectionEngine>;
}

/// Two-tier detector: all languages first, common languages as a fallback.
#[derive(Clone)]
pub struct Detector {
    all_languages: Arc<dyn DetectionEngine>,
    common_languages: Arc<dyn DetectionEngine>,
    builder: Arc<dyn EngineBuilder>,
    threshold: f64,
}

impl Detector {
    pub fn new(builder: Arc<dyn EngineBuilder>) -> Self {
        Self {
            all_languages: builder.build(&Language::all()),
            common_languages: builder.build(&Language::common()),
            builder,
            threshold: DEFAULT_DETECTION_THRESHOLD,
        }
    }

    /// Override the default confidence threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Detect the language of `text` using the configured threshold.
    pub fn detect(&self, text: &str) -> Option<Language> {
        self.detect_with_threshold(text, self.threshold)
    }

    /// Detect the language of `text`, falling back to the common-language
    /// engine when the full engine's confidence is below `threshold`.
    pub fn detect_with_threshold(&self, text: &str, threshold: f64) -> Option<Language> {
        let language = self.all_languages.detect_language_of(text)?;

        let confidence = self
            .all_languages
            .compute_language_confidence(text, language);
        if confidence >= threshold {
            return Some(language);
        }

        debug!(
            "Low confidence ({:.2}) for {}; retrying with common languages",
            confidence, language
        );
        self.common_languages.detect_language_of(text)
    }

    /// Build an engine that only chooses between `a` and `b`.
    pub fn build_scoped(&self, a: Language, b: Language) -> Arc<dyn DetectionEngine> {
        self.builder.build(&[a, b])
    }

    pub fn builder(&self) -> Arc<dyn EngineBuilder> {
        Arc::clone(&self.builder)
    }
}

static MARKUP: OnceLock<Regex> = OnceLock::new();
static LINK_LABEL: OnceLock<Regex> = OnceLock::new();
static EMOJI: OnceLock<Regex> = OnceLock::new();
static CODE: OnceLock<Regex> = OnceLock::new();

/// Strip Slack markup that carries no language signal.
///
/// Labeled links keep their label; mentions, bare links, emoji shortcodes and
/// code spans are removed.
pub fn strip_markup(text: &str) -> String {
    let code = CODE.get_or_init(|| Regex::new(r"(?s)```.*?```|`[^`]*`").unwrap());
    let link_label = LINK_LABEL.get_or_init(|| Regex::new(r"<[^<>|]+\|([^<>]+)>").unwrap());
    let markup = MARKUP.get_or_init(|| Regex::new(r"<[^<>]*>").unwrap());
    let emoji = EMOJI.get_or_init(|| Regex::new(r":[a-z0-9_+\-]+:").unwrap());

    let text = code.replace_all(text, " ");
    let text = link_label.replace_all(&text, "$1");
    let text = markup.replace_all(&text, " ");
    let text = emoji.replace_all(&text, " ");

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
