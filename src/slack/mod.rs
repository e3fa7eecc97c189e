//! Slack integration: inbound payloads, the Web API client and the
//! [`Transport`] seam the router talks through.

pub mod blocks;
pub mod client;
pub mod events;
pub mod mock;

pub use client::SlackClient;
pub use events::{BlockAction, Event};

use anyhow::Result;
use async_trait::async_trait;

/// A message fetched back from Slack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedMessage {
    pub text: String,
    pub ts: String,
    /// Root of the thread the message belongs to, if any
    pub thread_ts: Option<String>,
}

impl FetchedMessage {
    /// Where replies to this message go: its thread root, or itself.
    pub fn thread_anchor(&self) -> &str {
        self.thread_ts.as_deref().unwrap_or(&self.ts)
    }
}

/// Outbound operations against the chat platform.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch_message(&self, channel: &str, ts: &str) -> Result<FetchedMessage>;

    /// Post `text` in the thread rooted at `thread_ts`.
    async fn post_reply(&self, channel: &str, thread_ts: &str, text: &str) -> Result<()>;

    /// Post `text` visible only to `user`, optionally inside a thread.
    async fn post_ephemeral(
        &self,
        channel: &str,
        user: &str,
        thread_ts: Option<&str>,
        text: &str,
    ) -> Result<()>;

    async fn post_message(&self, channel: &str, text: &str) -> Result<()>;

    async fn post_language_prompt(&self, channel: &str) -> Result<()>;
}
