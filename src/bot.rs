//! Event router.
//!
//! One [`Bot`] consumes events in arrival order and drives detection,
//! translation and replies. It owns the channel registry, so registry
//! mutations from slash commands and interactions need no locking; the
//! dedup cache is shared with the scheduler's sweep job.
//!
//! Error policy: non-flag reactions, unconfigured channels, duplicates and
//! ambiguous auto-translation detection are absorbed and logged. Everything
//! else that stops a translation is reported to the acting user as an
//! ephemeral message with a fixed text, while the detail goes to the log.

use crate::channels::ChannelRegistry;
use crate::dedup::DedupCache;
use crate::detect::{strip_markup, Detector};
use crate::error::BotError;
use crate::flags;
use crate::i18n::Language;
use crate::messages;
use crate::metrics::BotMetrics;
use crate::slack::blocks::LANGUAGE_SELECT_ACTION_ID;
use crate::slack::{BlockAction, Event, Transport};
use crate::translation::Translator;
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Default upper bound for a single translation call
pub const DEFAULT_TRANSLATION_TIMEOUT: Duration = Duration::from_secs(60);

pub struct Bot {
    transport: Arc<dyn Transport>,
    translator: Arc<dyn Translator>,
    detector: Detector,
    registry: ChannelRegistry,
    dedup: Arc<DedupCache>,
    metrics: Arc<BotMetrics>,
    translation_timeout: Duration,
}

impl Bot {
    pub fn new(
        transport: Arc<dyn Transport>,
        translator: Arc<dyn Translator>,
        detector: Detector,
        registry: ChannelRegistry,
        dedup: Arc<DedupCache>,
    ) -> Self {
        Self {
            transport,
            translator,
            detector,
            registry,
            dedup,
            metrics: Arc::new(BotMetrics::new()),
            translation_timeout: DEFAULT_TRANSLATION_TIMEOUT,
        }
    }

    /// Share a metrics instance with other components.
    pub fn with_metrics(mut self, metrics: Arc<BotMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_translation_timeout(mut self, timeout: Duration) -> Self {
        self.translation_timeout = timeout;
        self
    }

    pub fn registry(&self) -> &ChannelRegistry {
        &self.registry
    }

    pub fn metrics(&self) -> &Arc<BotMetrics> {
        &self.metrics
    }

    /// Process events until every sender is dropped, then hand back the
    /// registry so it can be persisted.
    pub async fn run(mut self, mut events: mpsc::Receiver<Event>) -> ChannelRegistry {
        info!("Event router started");
        while let Some(event) = events.recv().await {
            self.handle(event).await;
        }
        info!("Event channel closed; router stopped");
        self.registry
    }

    /// Process a single event to completion.
    pub async fn handle(&mut self, event: Event) {
        match event {
            Event::ReactionAdded {
                user,
                reaction,
                channel,
                item_ts,
            } => self.handle_reaction(&user, &reaction, &channel, &item_ts).await,
            Event::Message {
                channel,
                user,
                text,
                ts,
                thread_ts,
                bot_id,
            } => {
                if bot_id.is_some() || text.trim().is_empty() {
                    return;
                }
                self.handle_message(&channel, &user, &text, &ts, thread_ts.as_deref())
                    .await
            }
            Event::SlashCommand {
                command,
                text,
                channel_id,
                user_id,
            } => {
                if let Err(e) = self.handle_command(&command, &text, &channel_id).await {
                    warn!(
                        "Failed to handle {} from {} in {}: {:#}",
                        command, user_id, channel_id, e
                    );
                }
            }
            Event::Interaction {
                channel_id,
                user_id,
                message_ts,
                actions,
            } => {
                if let Err(e) = self
                    .handle_interaction(&channel_id, &user_id, message_ts.as_deref(), &actions)
                    .await
                {
                    warn!("Failed to handle interaction in {}: {:#}", channel_id, e);
                }
            }
        }
    }

    // ==================== Flag reactions ====================

    async fn handle_reaction(&self, user: &str, reaction: &str, channel: &str, item_ts: &str) {
        if self.dedup.check_and_mark(item_ts, user) {
            self.metrics.record_duplicate();
            info!("Duplicate reaction on {} by {}; skipping", item_ts, user);
            return;
        }

        let Some(target) = flags::resolve(reaction) else {
            debug!("Ignoring non-flag reaction :{}:", reaction);
            return;
        };

        let mut anchor = item_ts.to_string();
        if let Err(err) = self
            .translate_reaction(channel, item_ts, reaction, target, &mut anchor)
            .await
        {
            self.report_error(channel, user, &anchor, &err).await;
        }
    }

    /// `anchor` is updated to the message's thread root as soon as it is known.
    async fn translate_reaction(
        &self,
        channel: &str,
        item_ts: &str,
        reaction: &str,
        target: &str,
        anchor: &mut String,
    ) -> Result<(), BotError> {
        let message = self
            .transport
            .fetch_message(channel, item_ts)
            .await
            .context(format!("Failed to fetch message {} in {}", item_ts, channel))?;
        *anchor = message.thread_anchor().to_string();

        if target.is_empty() {
            return Err(BotError::UnsupportedFlag(reaction.to_string()));
        }

        let source = self
            .detector
            .detect(&strip_markup(&message.text))
            .ok_or_else(|| {
                self.metrics.record_detection_failure();
                BotError::UnknownLanguage
            })?;

        info!(
            "Translating {} in {} from {} to {} (:{}:)",
            item_ts, channel, source, target, reaction
        );
        let translated = self.translate(source.name(), target, &message.text).await?;
        self.deliver(channel, anchor, &translated).await
    }

    // ==================== Auto-translation ====================

    async fn handle_message(
        &self,
        channel: &str,
        user: &str,
        text: &str,
        ts: &str,
        thread_ts: Option<&str>,
    ) {
        let pair = match self.registry.get(channel) {
            Ok(state) => state.selected(),
            Err(err) => {
                debug!("{}", err);
                return;
            }
        };

        if self.dedup.check_and_mark(ts, user) {
            self.metrics.record_duplicate();
            info!("Duplicate message {} from {}; skipping", ts, user);
            return;
        }

        // Text with no letters left after markup is stripped (emoji, links,
        // numbers) carries nothing to translate
        let stripped = strip_markup(text);
        if !stripped.chars().any(char::is_alphabetic) {
            self.metrics.record_detection_failure();
            info!("Skipping auto-translation of {} in {}: no text to detect", ts, channel);
            return;
        }

        let source = match self.registry.select_language_of(channel, &stripped) {
            Ok(language) => language,
            Err(err) => {
                self.metrics.record_detection_failure();
                info!("Skipping auto-translation of {} in {}: {}", ts, channel, err);
                return;
            }
        };

        let Some(target) = pair.other(source) else {
            info!(
                "Detected {} is outside the pair {} for {}; skipping",
                source, pair, channel
            );
            return;
        };

        let anchor = thread_ts.unwrap_or(ts);
        if let Err(err) = self.auto_translate(channel, anchor, source, target, text).await {
            self.report_error(channel, user, anchor, &err).await;
        }
    }

    async fn auto_translate(
        &self,
        channel: &str,
        anchor: &str,
        source: Language,
        target: Language,
        text: &str,
    ) -> Result<(), BotError> {
        info!("Auto-translating in {}: {} -> {}", channel, source, target);
        let translated = self.translate(source.name(), target.name(), text).await?;
        self.deliver(channel, anchor, &translated).await
    }

    // ==================== Commands and interactions ====================

    async fn handle_command(&mut self, command: &str, text: &str, channel: &str) -> anyhow::Result<()> {
        match command {
            "/help" => self.transport.post_message(channel, messages::HELP).await,
            "/translate" => {
                let stop = text
                    .split_whitespace()
                    .any(|word| word.eq_ignore_ascii_case("stop"));
                if stop {
                    self.registry.clear(channel);
                    self.transport
                        .post_message(channel, messages::AUTO_TRANSLATION_STOPPED)
                        .await
                } else {
                    self.transport.post_language_prompt(channel).await
                }
            }
            other => {
                debug!("Ignoring unknown command {}", other);
                Ok(())
            }
        }
    }

    async fn handle_interaction(
        &mut self,
        channel: &str,
        user: &str,
        message_ts: Option<&str>,
        actions: &[BlockAction],
    ) -> anyhow::Result<()> {
        let selections = actions
            .iter()
            .filter(|action| action.action_id == LANGUAGE_SELECT_ACTION_ID);

        for action in selections {
            let [first, second] = action.selected.as_slice() else {
                self.post_in_thread(channel, message_ts, messages::SELECT_TWO_LANGUAGES)
                    .await?;
                continue;
            };

            match self.registry.select(channel, first, second) {
                Ok(changed) => {
                    let pair = self.registry.get(channel)?.selected();
                    let template = if changed {
                        info!("Auto-translation in {} set to {} by {}", channel, pair, user);
                        messages::AUTO_TRANSLATION_ACTIVATED
                    } else {
                        messages::AUTO_TRANSLATION_ALREADY_ACTIVE
                    };
                    let text = template
                        .replace("{l1}", pair.l1.name())
                        .replace("{l2}", pair.l2.name());
                    self.post_in_thread(channel, message_ts, &text).await?;
                }
                Err(err @ BotError::InvalidLanguage(_)) => {
                    warn!("Rejected selection in {}: {}", channel, err);
                    self.metrics.record_user_error();
                    self.transport
                        .post_ephemeral(channel, user, message_ts, &err.user_message())
                        .await?;
                }
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }

    // ==================== Helpers ====================

    /// Translate with the configured timeout.
    async fn translate(&self, source: &str, target: &str, text: &str) -> Result<String, BotError> {
        let call = self.translator.translate(source, "", target, "", text);
        match tokio::time::timeout(self.translation_timeout, call).await {
            Ok(Ok(translated)) => Ok(translated),
            Ok(Err(e)) => {
                self.metrics.record_translation_failure();
                Err(e
                    .context(format!("Translation {} -> {} failed", source, target))
                    .into())
            }
            Err(_) => {
                self.metrics.record_translation_failure();
                Err(anyhow::anyhow!(
                    "Translation {} -> {} timed out after {:?}",
                    source,
                    target,
                    self.translation_timeout
                )
                .into())
            }
        }
    }

    async fn deliver(&self, channel: &str, anchor: &str, text: &str) -> Result<(), BotError> {
        if let Err(e) = self.transport.post_reply(channel, anchor, text).await {
            self.metrics.record_translation_failure();
            return Err(e
                .context(format!("Failed to post translation in {}", channel))
                .into());
        }
        self.metrics.record_translation_delivered();
        Ok(())
    }

    async fn post_in_thread(&self, channel: &str, ts: Option<&str>, text: &str) -> anyhow::Result<()> {
        match ts {
            Some(ts) => self.transport.post_reply(channel, ts, text).await,
            None => self.transport.post_message(channel, text).await,
        }
    }

    /// Log `err` and show its fixed user-facing text to `user` only.
    async fn report_error(&self, channel: &str, user: &str, anchor: &str, err: &BotError) {
        match err {
            BotError::Internal(_) => error!("Translation in {} failed: {}", channel, err),
            _ => warn!("Translation in {} not possible: {}", channel, err),
        }

        self.metrics.record_user_error();
        if let Err(e) = self
            .transport
            .post_ephemeral(channel, user, Some(anchor), &err.user_message())
            .await
        {
            error!("Failed to post error message to {} in {}: {:#}", user, channel, e);
        }
    }
}
