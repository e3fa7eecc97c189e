//! Mock translator for testing
//!
//! Deterministic and API-free. Every call is recorded so tests can assert
//! on the language direction the router chose.
//!
//! # Example
//!
//! ```ignore
//! let mock = MockTranslator::new(MockMode::Tagged);
//! let out = mock.translate("French", "", "English", "", "Bonjour").await?;
//! assert_eq!(out, "[English] Bonjour");
//! assert_eq!(mock.calls()[0].source, "French");
//! ```

use super::Translator;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// How the mock produces its output
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Prefix the target language: "Bonjour" → "[English] Bonjour"
    Tagged,

    /// (text, target) → translation, falling back to `Tagged`
    Mappings(HashMap<(String, String), String>),

    /// Fail every call with the given message
    Error(String),
}

/// One recorded `translate` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationCall {
    pub source: String,
    pub source_dialect: String,
    pub target: String,
    pub target_dialect: String,
    pub text: String,
}

#[derive(Debug)]
pub struct MockTranslator {
    mode: MockMode,
    delay: Duration,
    calls: Mutex<Vec<TranslationCall>>,
}

impl MockTranslator {
    pub fn new(mode: MockMode) -> Self {
        Self {
            mode,
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Sleep before answering, to exercise timeouts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<TranslationCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls().len()
    }
}

impl Default for MockTranslator {
    fn default() -> Self {
        Self::new(MockMode::Tagged)
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(
        &self,
        source: &str,
        source_dialect: &str,
        target: &str,
        target_dialect: &str,
        text: &str,
    ) -> Result<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(TranslationCall {
                source: source.to_string(),
                source_dialect: source_dialect.to_string(),
                target: target.to_string(),
                target_dialect: target_dialect.to_string(),
                text: text.to_string(),
            });
        }

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match &self.mode {
            MockMode::Tagged => Ok(format!("[{}] {}", target, text)),
            MockMode::Mappings(map) => Ok(map
                .get(&(text.to_string(), target.to_string()))
                .cloned()
                .unwrap_or_else(|| format!("[{}] {}", target, text))),
            MockMode::Error(message) => Err(anyhow::anyhow!("{}", message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_tagged_mode() {
        let mock = MockTranslator::default();
        let out = mock
            .translate("French", "", "English", "", "Bonjour")
            .await
            .unwrap();
        assert_eq!(out, "[English] Bonjour");
    }

    #[tokio::test]
    async fn test_mappings_mode() {
        let mut map = HashMap::new();
        map.insert(
            ("Hello".to_string(), "Japanese".to_string()),
            "こんにちは".to_string(),
        );
        let mock = MockTranslator::new(MockMode::Mappings(map));

        assert_eq!(
            mock.translate("English", "", "Japanese", "", "Hello").await.unwrap(),
            "こんにちは"
        );
        assert_eq!(
            mock.translate("English", "", "French", "", "Hello").await.unwrap(),
            "[French] Hello"
        );
    }

    #[tokio::test]
    async fn test_error_mode_still_records_call() {
        let mock = MockTranslator::new(MockMode::Error("backend down".to_string()));
        let err = mock
            .translate("English", "", "French", "", "Hi")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("backend down"));
        assert_eq!(mock.call_count(), 1);
        assert_eq!(mock.calls()[0].target, "French");
    }
}
