use super::{build_prompt, Translator};
use crate::config::Config;
use crate::retry::{is_retryable_api_error, with_retry_if, RetryConfig};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Smallest completion budget sent with a request
const MIN_MAX_TOKENS: u32 = 512;

/// Largest completion budget sent with a request
const MAX_MAX_TOKENS: u32 = 4096;

const SYSTEM_PROMPT: &str = "You are a translator for a team chat. Reply with the translation only. \
Keep @mentions, #channels, URLs, emoji and code exactly as written.";

/// OpenAI Chat Completion request for translation
#[derive(Debug, Serialize)]
struct TranslationRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
    #[serde(default)]
    finish_reason: Option<String>,
}

/// The model stopped at the token limit, so the reply is only part of the
/// translation. Retrying the same request cannot fix this.
#[derive(Debug, thiserror::Error)]
#[error("OpenAI translation was truncated at {max_tokens} tokens")]
pub struct TranslationTruncated {
    pub max_tokens: u32,
}

fn is_retryable_translation_error(error: &anyhow::Error) -> bool {
    error.downcast_ref::<TranslationTruncated>().is_none() && is_retryable_api_error(error)
}

/// Completion budget for `text`: one token per input character, clamped.
fn max_tokens_for(text: &str) -> u32 {
    u32::try_from(text.chars().count())
        .unwrap_or(u32::MAX)
        .clamp(MIN_MAX_TOKENS, MAX_MAX_TOKENS)
}

/// Translator backed by the OpenAI chat-completions API.
#[derive(Debug, Clone)]
pub struct OpenAiTranslator {
    client: reqwest::Client,
    api_key: String,
    model: String,
    api_url: String,
    retry: RetryConfig,
}

impl OpenAiTranslator {
    pub fn new(client: reqwest::Client, api_key: &str, model: &str, api_url: &str) -> Self {
        Self {
            client,
            api_key: api_key.to_string(),
            model: model.to_string(),
            api_url: api_url.to_string(),
            retry: RetryConfig::translation(),
        }
    }

    pub fn from_config(client: reqwest::Client, config: &Config) -> Self {
        Self::new(
            client,
            &config.openai_api_key,
            &config.openai_model,
            &config.openai_api_url,
        )
    }

    /// Override the retry policy.
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn request_for(&self, prompt: String, max_tokens: u32) -> TranslationRequest {
        TranslationRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: prompt,
                },
            ],
            max_tokens,
            temperature: 0.3,
        }
    }
}

#[async_trait]
impl Translator for OpenAiTranslator {
    async fn translate(
        &self,
        source: &str,
        source_dialect: &str,
        target: &str,
        target_dialect: &str,
        text: &str,
    ) -> Result<String> {
        let prompt = build_prompt(source, source_dialect, target, target_dialect, text)?;
        let max_tokens = max_tokens_for(text);
        let request = self.request_for(prompt, max_tokens);
        debug!("Requesting translation {} -> {}", source, target);

        with_retry_if(
            &self.retry,
            &format!("Translation {} -> {}", source, target),
            || async {
                let response = self
                    .client
                    .post(&self.api_url)
                    .header("Authorization", format!("Bearer {}", self.api_key))
                    .header("Content-Type", "application/json")
                    .json(&request)
                    .send()
                    .await
                    .context("Failed to send translation request to OpenAI API")?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response
                        .text()
                        .await
                        .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
                    anyhow::bail!("OpenAI API error during translation ({}): {}", status, body);
                }

                let chat_response: ChatResponse = response
                    .json()
                    .await
                    .context("Failed to parse OpenAI translation response")?;

                let choice = chat_response
                    .choices
                    .first()
                    .context("OpenAI translation response contained no choices")?;

                if choice.finish_reason.as_deref() == Some("length") {
                    warn!(
                        "Translation {} -> {} hit the {} token limit",
                        source, target, max_tokens
                    );
                    return Err(TranslationTruncated { max_tokens }.into());
                }

                let translated = choice.message.content.trim().to_string();

                if translated.is_empty() {
                    anyhow::bail!("OpenAI returned an empty translation");
                }
                Ok(translated)
            },
            is_retryable_translation_error,
        )
        .await
    }
}
