//! Per-channel auto-translation registry.
//!
//! A channel opts into auto-translation by selecting a language pair. The
//! registry keeps that pair together with a detection engine scoped to
//! exactly those two languages. Channels that never selected a pair are
//! simply absent.
//!
//! The registry is snapshotted to JSON at shutdown and restored at startup.
//! Only the pairs are persisted; hydration replays [`ChannelRegistry::select`]
//! so restored channels get freshly built engines.

use crate::detect::{DetectionEngine, EngineBuilder};
use crate::error::BotError;
use crate::i18n::Language;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Two selected languages in named slots.
///
/// Equality is slot-wise: `(English, French)` and `(French, English)` are
/// different values even though they translate the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguagePair {
    pub l1: Language,
    pub l2: Language,
}

impl LanguagePair {
    pub fn new(l1: Language, l2: Language) -> Self {
        Self { l1, l2 }
    }

    /// The member of the pair that `source` translates into.
    ///
    /// Returns `None` when `source` is in neither slot.
    pub fn other(&self, source: Language) -> Option<Language> {
        if source == self.l1 {
            Some(self.l2)
        } else if source == self.l2 {
            Some(self.l1)
        } else {
            None
        }
    }
}

impl fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <-> {}", self.l1, self.l2)
    }
}

/// Auto-translation state of one channel.
#[derive(Clone)]
pub struct ChannelState {
    selected: LanguagePair,
    engine: Arc<dyn DetectionEngine>,
}

impl ChannelState {
    pub fn selected(&self) -> LanguagePair {
        self.selected
    }

    pub fn engine(&self) -> &Arc<dyn DetectionEngine> {
        &self.engine
    }
}

impl fmt::Debug for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelState")
            .field("selected", &self.selected)
            .finish_non_exhaustive()
    }
}

/// Persisted form of the registry.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    #[serde(default)]
    channels: BTreeMap<String, SnapshotEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotEntry {
    selected: SnapshotPair,
}

// Names stay plain strings here so hydration goes through `select`.
#[derive(Debug, Serialize, Deserialize)]
struct SnapshotPair {
    l1: String,
    l2: String,
}

/// Channel id → auto-translation state.
pub struct ChannelRegistry {
    channels: HashMap<String, ChannelState>,
    builder: Arc<dyn EngineBuilder>,
}

impl std::fmt::Debug for ChannelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelRegistry")
            .field("channels", &self.channels.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl ChannelRegistry {
    pub fn new(builder: Arc<dyn EngineBuilder>) -> Self {
        Self {
            channels: HashMap::new(),
            builder,
        }
    }

    /// Select the auto-translation pair for a channel.
    ///
    /// Returns `Ok(true)` when the channel was unconfigured or its pair
    /// differs slot-wise from the new one (the scoped engine is rebuilt), and
    /// `Ok(false)` when the identical pair was already selected.
    pub fn select(&mut self, channel: &str, lang1: &str, lang2: &str) -> Result<bool, BotError> {
        let l1 = Language::from_name(lang1)
            .ok_or_else(|| BotError::InvalidLanguage(lang1.to_string()))?;
        let l2 = Language::from_name(lang2)
            .ok_or_else(|| BotError::InvalidLanguage(lang2.to_string()))?;
        let pair = LanguagePair::new(l1, l2);

        if let Some(existing) = self.channels.get(channel) {
            if existing.selected == pair {
                return Ok(false);
            }
        }

        info!("Reconfiguring detector for channel {}: {}", channel, pair);
        let state = ChannelState {
            selected: pair,
            engine: self.builder.build(&[l1, l2]),
        };
        self.channels.insert(channel.to_string(), state);
        Ok(true)
    }

    /// Remove a channel's selection. Clearing an unconfigured channel is a no-op.
    pub fn clear(&mut self, channel: &str) {
        if self.channels.remove(channel).is_some() {
            info!("Cleared auto-translation for channel {}", channel);
        }
    }

    /// Get a channel's state, or `NotConfigured` if it never selected a pair.
    pub fn get(&self, channel: &str) -> Result<&ChannelState, BotError> {
        self.channels
            .get(channel)
            .ok_or_else(|| BotError::NotConfigured(channel.to_string()))
    }

    /// Pick the pair member `text` is most likely written in.
    ///
    /// Confidence values come back in engine order; the highest wins and ties
    /// (including no signal at all) go to the earlier value. Only an engine
    /// that returns no values yields `UnknownLanguage`.
    pub fn select_language_of(&self, channel: &str, text: &str) -> Result<Language, BotError> {
        let state = self.get(channel)?;
        let confidences = state.engine.compute_language_confidence_values(text);

        let mut best: Option<(Language, f64)> = None;
        for (language, confidence) in confidences {
            if best.map_or(true, |(_, top)| confidence > top) {
                best = Some((language, confidence));
            }
        }

        best.map(|(language, _)| language)
            .ok_or(BotError::UnknownLanguage)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Configured channel ids, sorted.
    pub fn channel_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.channels.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Serialize every channel's pair to a JSON blob.
    pub fn serialize(&self) -> anyhow::Result<Vec<u8>> {
        let snapshot = Snapshot {
            channels: self
                .channels
                .iter()
                .map(|(channel, state)| {
                    let entry = SnapshotEntry {
                        selected: SnapshotPair {
                            l1: state.selected.l1.name().to_string(),
                            l2: state.selected.l2.name().to_string(),
                        },
                    };
                    (channel.clone(), entry)
                })
                .collect(),
        };
        serde_json::to_vec_pretty(&snapshot).context("Failed to serialize channel registry")
    }

    /// Restore channels from a blob produced by [`ChannelRegistry::serialize`].
    ///
    /// Each channel is re-selected, so an unknown language in the blob fails
    /// with `InvalidLanguage`. Channels already present are overwritten.
    pub fn hydrate(&mut self, bytes: &[u8]) -> Result<(), BotError> {
        let snapshot: Snapshot =
            serde_json::from_slice(bytes).context("Failed to parse channel registry snapshot")?;

        for (channel, entry) in &snapshot.channels {
            self.select(channel, &entry.selected.l1, &entry.selected.l2)?;
        }

        info!("Hydrated {} auto-translation channels", snapshot.channels.len());
        Ok(())
    }
}
