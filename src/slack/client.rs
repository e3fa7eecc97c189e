use super::{blocks, FetchedMessage, Transport};
use crate::config::Config;
use crate::messages;
use crate::retry::{is_retryable_api_error, with_retry_if, RetryConfig};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Slack answered HTTP 200 with `"ok": false`.
///
/// These are permanent (bad channel, missing scope, ...) and never retried.
#[derive(Debug, thiserror::Error)]
#[error("Slack method {method} failed: {error}")]
pub struct SlackRejection {
    pub method: String,
    pub error: String,
}

fn is_retryable_slack_error(error: &anyhow::Error) -> bool {
    error.downcast_ref::<SlackRejection>().is_none() && is_retryable_api_error(error)
}

#[derive(Debug, Deserialize)]
struct SlackResponse<T> {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(flatten)]
    body: T,
}

#[derive(Debug, Deserialize)]
struct RepliesBody {
    #[serde(default)]
    messages: Vec<ReplyMessage>,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    text: String,
    #[serde(default)]
    ts: String,
    thread_ts: Option<String>,
    #[serde(default)]
    attachments: Vec<Attachment>,
}

#[derive(Debug, Deserialize)]
struct Attachment {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct Ignored {}

#[derive(Debug, Serialize)]
struct PostMessageRequest<'a> {
    channel: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    thread_ts: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    blocks: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct PostEphemeralRequest<'a> {
    channel: &'a str,
    user: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    thread_ts: Option<&'a str>,
}

/// Slack Web API client.
#[derive(Debug, Clone)]
pub struct SlackClient {
    client: reqwest::Client,
    bot_token: String,
    api_url: String,
    retry: RetryConfig,
}

impl SlackClient {
    pub fn new(client: reqwest::Client, bot_token: &str, api_url: &str) -> Self {
        Self {
            client,
            bot_token: bot_token.to_string(),
            api_url: api_url.trim_end_matches('/').to_string(),
            retry: RetryConfig::slack_api(),
        }
    }

    pub fn from_config(client: reqwest::Client, config: &Config) -> Self {
        Self::new(client, &config.slack_bot_token, &config.slack_api_url)
    }

    /// Override the retry policy.
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.api_url, method)
    }

    /// Send one Web API request, with retries, and unwrap Slack's `ok` envelope.
    async fn call<T, F>(&self, method: &str, build: F) -> Result<T>
    where
        T: DeserializeOwned + Send,
        F: Fn() -> reqwest::RequestBuilder + Send + Sync,
    {
        with_retry_if(
            &self.retry,
            &format!("Slack {}", method),
            || async {
                let response = build()
                    .bearer_auth(&self.bot_token)
                    .send()
                    .await
                    .context(format!("Failed to send request to Slack API ({})", method))?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    anyhow::bail!("Slack API error ({}): {}", status, body);
                }

                let envelope: SlackResponse<T> = response
                    .json()
                    .await
                    .context(format!("Failed to parse Slack {} response", method))?;

                if !envelope.ok {
                    return Err(SlackRejection {
                        method: method.to_string(),
                        error: envelope.error.unwrap_or_else(|| "unknown_error".to_string()),
                    }
                    .into());
                }

                Ok(envelope.body)
            },
            is_retryable_slack_error,
        )
        .await
    }

    async fn post_json<B: Serialize + Sync>(&self, method: &str, body: &B) -> Result<()> {
        let url = self.method_url(method);
        let _: Ignored = self
            .call(method, || self.client.post(&url).json(body))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Transport for SlackClient {
    /// https://api.slack.com/methods/conversations.replies
    async fn fetch_message(&self, channel: &str, ts: &str) -> Result<FetchedMessage> {
        let url = self.method_url("conversations.replies");
        let body: RepliesBody = self
            .call("conversations.replies", || {
                self.client.get(&url).query(&[
                    ("channel", channel),
                    ("ts", ts),
                    ("inclusive", "true"),
                    ("limit", "1"),
                ])
            })
            .await?;

        let message = body
            .messages
            .into_iter()
            .next()
            .with_context(|| format!("No message {} found in channel {}", ts, channel))?;

        let text = if message.text.is_empty() {
            message
                .attachments
                .into_iter()
                .map(|a| a.text)
                .find(|t| !t.is_empty())
                .unwrap_or_default()
        } else {
            message.text
        };

        let ts = if message.ts.is_empty() {
            ts.to_string()
        } else {
            message.ts
        };

        debug!("Fetched message {} from channel {}", ts, channel);
        Ok(FetchedMessage {
            text,
            ts,
            thread_ts: message.thread_ts.filter(|t| !t.is_empty()),
        })
    }

    async fn post_reply(&self, channel: &str, thread_ts: &str, text: &str) -> Result<()> {
        let request = PostMessageRequest {
            channel,
            text,
            thread_ts: Some(thread_ts),
            blocks: None,
        };
        self.post_json("chat.postMessage", &request).await
    }

    async fn post_ephemeral(
        &self,
        channel: &str,
        user: &str,
        thread_ts: Option<&str>,
        text: &str,
    ) -> Result<()> {
        let request = PostEphemeralRequest {
            channel,
            user,
            text,
            thread_ts,
        };
        self.post_json("chat.postEphemeral", &request).await
    }

    async fn post_message(&self, channel: &str, text: &str) -> Result<()> {
        let request = PostMessageRequest {
            channel,
            text,
            thread_ts: None,
            blocks: None,
        };
        self.post_json("chat.postMessage", &request).await
    }

    async fn post_language_prompt(&self, channel: &str) -> Result<()> {
        let request = PostMessageRequest {
            channel,
            text: messages::LANGUAGE_PROMPT,
            thread_ts: None,
            blocks: Some(blocks::language_select_blocks()),
        };
        self.post_json("chat.postMessage", &request).await
    }
}
