//! In-memory transport for testing
//!
//! Serves fetches from a fixed set of messages and records everything the
//! router posts, in order.

use super::{FetchedMessage, Transport};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// One outbound call recorded by [`RecordingTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Reply {
        channel: String,
        thread_ts: String,
        text: String,
    },
    Ephemeral {
        channel: String,
        user: String,
        thread_ts: Option<String>,
        text: String,
    },
    Message {
        channel: String,
        text: String,
    },
    LanguagePrompt {
        channel: String,
    },
}

#[derive(Debug, Default)]
pub struct RecordingTransport {
    messages: Mutex<HashMap<(String, String), FetchedMessage>>,
    sent: Mutex<Vec<Sent>>,
    fail_fetch: AtomicBool,
    fail_replies: AtomicBool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a message fetchable at `(channel, ts)`.
    pub fn with_message(self, channel: &str, ts: &str, text: &str, thread_ts: Option<&str>) -> Self {
        if let Ok(mut messages) = self.messages.lock() {
            messages.insert(
                (channel.to_string(), ts.to_string()),
                FetchedMessage {
                    text: text.to_string(),
                    ts: ts.to_string(),
                    thread_ts: thread_ts.map(str::to_string),
                },
            );
        }
        self
    }

    /// Fail every `fetch_message` call.
    pub fn failing_fetch(self) -> Self {
        self.fail_fetch.store(true, Ordering::SeqCst);
        self
    }

    /// Fail every `post_reply` call. Ephemeral posts still succeed.
    pub fn failing_replies(self) -> Self {
        self.fail_replies.store(true, Ordering::SeqCst);
        self
    }

    /// Everything posted so far.
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    /// Only the threaded replies.
    pub fn replies(&self) -> Vec<Sent> {
        self.sent()
            .into_iter()
            .filter(|s| matches!(s, Sent::Reply { .. }))
            .collect()
    }

    /// Only the ephemeral messages.
    pub fn ephemerals(&self) -> Vec<Sent> {
        self.sent()
            .into_iter()
            .filter(|s| matches!(s, Sent::Ephemeral { .. }))
            .collect()
    }

    fn record(&self, sent: Sent) {
        if let Ok(mut all) = self.sent.lock() {
            all.push(sent);
        }
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn fetch_message(&self, channel: &str, ts: &str) -> Result<FetchedMessage> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            anyhow::bail!("Slack API error (500 Internal Server Error): fetch failed");
        }
        self.messages
            .lock()
            .map_err(|_| anyhow::anyhow!("message store poisoned"))?
            .get(&(channel.to_string(), ts.to_string()))
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("No message {} found in channel {}", ts, channel))
    }

    async fn post_reply(&self, channel: &str, thread_ts: &str, text: &str) -> Result<()> {
        if self.fail_replies.load(Ordering::SeqCst) {
            anyhow::bail!("Slack method chat.postMessage failed: not_in_channel");
        }
        self.record(Sent::Reply {
            channel: channel.to_string(),
            thread_ts: thread_ts.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn post_ephemeral(
        &self,
        channel: &str,
        user: &str,
        thread_ts: Option<&str>,
        text: &str,
    ) -> Result<()> {
        self.record(Sent::Ephemeral {
            channel: channel.to_string(),
            user: user.to_string(),
            thread_ts: thread_ts.map(str::to_string),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn post_message(&self, channel: &str, text: &str) -> Result<()> {
        self.record(Sent::Message {
            channel: channel.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn post_language_prompt(&self, channel: &str) -> Result<()> {
        self.record(Sent::LanguagePrompt {
            channel: channel.to_string(),
        });
        Ok(())
    }
}
