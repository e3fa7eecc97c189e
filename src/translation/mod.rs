//! Translation backend abstraction.
//!
//! The router only depends on [`Translator`]. [`OpenAiTranslator`] talks to
//! the OpenAI chat-completions API; [`mock::MockTranslator`] is a
//! deterministic stand-in for tests.

pub mod mock;
mod openai;

pub use openai::OpenAiTranslator;

use anyhow::Result;
use async_trait::async_trait;

/// A machine translation backend.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` from `source` to `target`.
    ///
    /// Languages are English names ("French"). Dialects are free-form and
    /// may be empty; they only change how the request is phrased.
    async fn translate(
        &self,
        source: &str,
        source_dialect: &str,
        target: &str,
        target_dialect: &str,
        text: &str,
    ) -> Result<String>;
}

/// Build the translation instruction for a language pair.
///
/// # Example
/// ```ignore
/// let prompt = build_prompt("French", "", "English", "US", "Bonjour")?;
/// assert_eq!(prompt, "Translate this from French to English (US): Bonjour");
/// ```
pub fn build_prompt(
    source: &str,
    source_dialect: &str,
    target: &str,
    target_dialect: &str,
    text: &str,
) -> Result<String> {
    if source.trim().is_empty() || target.trim().is_empty() {
        anyhow::bail!("Source and target languages must both be set");
    }

    let from = with_dialect(source, source_dialect);
    let to = with_dialect(target, target_dialect);
    Ok(format!("Translate this from {} to {}: {}", from, to, text))
}

fn with_dialect(language: &str, dialect: &str) -> String {
    if dialect.trim().is_empty() {
        language.to_string()
    } else {
        format!("{} ({})", language, dialect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Prompt Tests ====================

    #[test]
    fn test_prompt_without_dialects() {
        assert_eq!(
            build_prompt("French", "", "English", "", "Bonjour").unwrap(),
            "Translate this from French to English: Bonjour"
        );
    }

    #[test]
    fn test_prompt_with_both_dialects() {
        assert_eq!(
            build_prompt("Portuguese", "Brazil", "English", "UK", "Oi").unwrap(),
            "Translate this from Portuguese (Brazil) to English (UK): Oi"
        );
    }

    #[test]
    fn test_prompt_with_one_dialect() {
        assert_eq!(
            build_prompt("Spanish", "Mexico", "English", "", "Hola").unwrap(),
            "Translate this from Spanish (Mexico) to English: Hola"
        );
        assert_eq!(
            build_prompt("English", "", "Chinese", "Traditional", "Hi").unwrap(),
            "Translate this from English to Chinese (Traditional): Hi"
        );
    }

    #[test]
    fn test_prompt_blank_dialect_is_ignored() {
        assert_eq!(
            build_prompt("French", "  ", "English", "", "Salut").unwrap(),
            "Translate this from French to English: Salut"
        );
    }

    #[test]
    fn test_prompt_requires_languages() {
        assert!(build_prompt("", "", "English", "", "text").is_err());
        assert!(build_prompt("French", "", " ", "", "text").is_err());
    }

    #[test]
    fn test_prompt_preserves_text() {
        let text = "Line one\nLine two with <@U123> and :wave:";
        let prompt = build_prompt("English", "", "German", "", text).unwrap();
        assert!(prompt.ends_with(text));
    }
}
