//! Inbound Slack payloads and the router's event enum.
//!
//! Slack sends three kinds of requests: Events API envelopes (JSON), slash
//! commands (form fields) and interactivity callbacks (a form field holding
//! JSON). Each is decoded into its wire type here and converted into an
//! [`Event`] for the router. Payload kinds the bot does not handle decode
//! into catch-all variants and convert to `None`.

use serde::Deserialize;

/// An inbound event the router acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    ReactionAdded {
        user: String,
        reaction: String,
        channel: String,
        item_ts: String,
    },
    Message {
        channel: String,
        user: String,
        text: String,
        ts: String,
        thread_ts: Option<String>,
        bot_id: Option<String>,
    },
    SlashCommand {
        command: String,
        text: String,
        channel_id: String,
        user_id: String,
    },
    Interaction {
        channel_id: String,
        user_id: String,
        message_ts: Option<String>,
        actions: Vec<BlockAction>,
    },
}

/// One action from a `block_actions` interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockAction {
    pub action_id: String,
    /// Display text of each selected option, in selection order
    pub selected: Vec<String>,
}

// ==================== Events API ====================

/// Top-level Events API envelope.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventEnvelope {
    UrlVerification {
        #[serde(default)]
        token: String,
        challenge: String,
    },
    EventCallback {
        #[serde(default)]
        token: String,
        event: CallbackEvent,
    },
    #[serde(other)]
    Unsupported,
}

impl EventEnvelope {
    pub fn token(&self) -> Option<&str> {
        match self {
            EventEnvelope::UrlVerification { token, .. }
            | EventEnvelope::EventCallback { token, .. } => Some(token),
            EventEnvelope::Unsupported => None,
        }
    }
}

/// Inner event of an `event_callback` envelope.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CallbackEvent {
    ReactionAdded {
        user: String,
        reaction: String,
        item: ReactionItem,
    },
    Message {
        #[serde(default)]
        channel: String,
        #[serde(default)]
        user: String,
        #[serde(default)]
        text: String,
        #[serde(default)]
        ts: String,
        thread_ts: Option<String>,
        bot_id: Option<String>,
    },
    #[serde(other)]
    Unsupported,
}

/// The item a reaction was added to.
#[derive(Debug, Deserialize)]
pub struct ReactionItem {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub channel: String,
    #[serde(default)]
    pub ts: String,
}

impl CallbackEvent {
    pub fn into_event(self) -> Option<Event> {
        match self {
            // Reactions on files and file comments carry no message to translate
            CallbackEvent::ReactionAdded {
                user,
                reaction,
                item,
            } if item.kind == "message" => Some(Event::ReactionAdded {
                user,
                reaction,
                channel: item.channel,
                item_ts: item.ts,
            }),
            CallbackEvent::ReactionAdded { .. } => None,
            CallbackEvent::Message {
                channel,
                user,
                text,
                ts,
                thread_ts,
                bot_id,
            } => Some(Event::Message {
                channel,
                user,
                text,
                ts,
                thread_ts: thread_ts.filter(|t| !t.is_empty()),
                bot_id: bot_id.filter(|b| !b.is_empty()),
            }),
            CallbackEvent::Unsupported => None,
        }
    }
}

// ==================== Slash commands ====================

/// Form fields of a slash command request.
#[derive(Debug, Deserialize)]
pub struct SlashCommandForm {
    #[serde(default)]
    pub token: String,
    pub command: String,
    #[serde(default)]
    pub text: String,
    pub channel_id: String,
    pub user_id: String,
}

impl SlashCommandForm {
    pub fn into_event(self) -> Event {
        Event::SlashCommand {
            command: self.command,
            text: self.text,
            channel_id: self.channel_id,
            user_id: self.user_id,
        }
    }
}

// ==================== Interactivity ====================

/// Form wrapper: interactivity requests put the JSON in a `payload` field.
#[derive(Debug, Deserialize)]
pub struct InteractionForm {
    pub payload: String,
}

/// Decoded interactivity payload.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InteractionPayload {
    BlockActions {
        #[serde(default)]
        token: String,
        user: IdRef,
        channel: Option<IdRef>,
        message: Option<MessageRef>,
        #[serde(default)]
        actions: Vec<ActionPayload>,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Deserialize)]
pub struct IdRef {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct MessageRef {
    pub ts: String,
}

#[derive(Debug, Deserialize)]
pub struct ActionPayload {
    pub action_id: String,
    #[serde(default)]
    pub selected_options: Vec<OptionPayload>,
}

#[derive(Debug, Deserialize)]
pub struct OptionPayload {
    pub text: TextPayload,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct TextPayload {
    pub text: String,
}

impl InteractionPayload {
    pub fn token(&self) -> Option<&str> {
        match self {
            InteractionPayload::BlockActions { token, .. } => Some(token),
            InteractionPayload::Unsupported => None,
        }
    }

    /// Block actions outside a channel (e.g. in a modal) are dropped.
    pub fn into_event(self) -> Option<Event> {
        match self {
            InteractionPayload::BlockActions {
                user,
                channel,
                message,
                actions,
                ..
            } => {
                let channel = channel?;
                Some(Event::Interaction {
                    channel_id: channel.id,
                    user_id: user.id,
                    message_ts: message.map(|m| m.ts),
                    actions: actions
                        .into_iter()
                        .map(|action| BlockAction {
                            action_id: action.action_id,
                            selected: action
                                .selected_options
                                .into_iter()
                                .map(|option| option.text.text)
                                .collect(),
                        })
                        .collect(),
                })
            }
            InteractionPayload::Unsupported => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Envelope Tests ====================

    #[test]
    fn test_url_verification() {
        let json = r#"{"token":"tok","challenge":"abc123","type":"url_verification"}"#;
        let envelope: EventEnvelope = serde_json::from_str(json).unwrap();
        assert!(matches!(
            envelope,
            EventEnvelope::UrlVerification { ref challenge, .. } if challenge == "abc123"
        ));
        assert_eq!(envelope.token(), Some("tok"));
    }

    #[test]
    fn test_unknown_envelope_type() {
        let json = r#"{"type":"app_rate_limited","minute_rate_limited":1518467820}"#;
        let envelope: EventEnvelope = serde_json::from_str(json).unwrap();
        assert!(matches!(envelope, EventEnvelope::Unsupported));
        assert_eq!(envelope.token(), None);
    }

    #[test]
    fn test_reaction_added() {
        let json = r#"{
            "token": "tok",
            "type": "event_callback",
            "event": {
                "type": "reaction_added",
                "user": "U1",
                "reaction": "flag-jp",
                "item_user": "U2",
                "item": {"type": "message", "channel": "C1", "ts": "1700000000.000100"},
                "event_ts": "1700000001.000200"
            }
        }"#;
        let envelope: EventEnvelope = serde_json::from_str(json).unwrap();
        let EventEnvelope::EventCallback { event, .. } = envelope else {
            panic!("expected event_callback");
        };
        assert_eq!(
            event.into_event(),
            Some(Event::ReactionAdded {
                user: "U1".to_string(),
                reaction: "flag-jp".to_string(),
                channel: "C1".to_string(),
                item_ts: "1700000000.000100".to_string(),
            })
        );
    }

    #[test]
    fn test_reaction_on_file_is_dropped() {
        let json = r#"{"type":"reaction_added","user":"U1","reaction":"fr",
            "item":{"type":"file","file":"F1"}}"#;
        let event: CallbackEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.into_event(), None);
    }

    #[test]
    fn test_threaded_message() {
        let json = r#"{"type":"message","channel":"C1","user":"U1","text":"Bonjour",
            "ts":"2.0","thread_ts":"1.0"}"#;
        let event: CallbackEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event.into_event(),
            Some(Event::Message {
                channel: "C1".to_string(),
                user: "U1".to_string(),
                text: "Bonjour".to_string(),
                ts: "2.0".to_string(),
                thread_ts: Some("1.0".to_string()),
                bot_id: None,
            })
        );
    }

    #[test]
    fn test_bot_message_keeps_bot_id() {
        let json = r#"{"type":"message","subtype":"bot_message","channel":"C1",
            "text":"[English] hi","ts":"3.0","bot_id":"B1"}"#;
        let event: CallbackEvent = serde_json::from_str(json).unwrap();
        let Some(Event::Message { bot_id, user, .. }) = event.into_event() else {
            panic!("expected message");
        };
        assert_eq!(bot_id.as_deref(), Some("B1"));
        assert_eq!(user, "");
    }

    #[test]
    fn test_message_changed_has_empty_text() {
        let json = r#"{"type":"message","subtype":"message_changed","channel":"C1",
            "ts":"4.0","message":{"text":"edited"}}"#;
        let event: CallbackEvent = serde_json::from_str(json).unwrap();
        let Some(Event::Message { text, .. }) = event.into_event() else {
            panic!("expected message");
        };
        assert!(text.is_empty());
    }

    #[test]
    fn test_unsupported_inner_event() {
        let json = r#"{"type":"app_mention","user":"U1","text":"hi","ts":"1.0","channel":"C1"}"#;
        let event: CallbackEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.into_event(), None);
    }

    // ==================== Interaction Tests ====================

    #[test]
    fn test_block_actions_payload() {
        let json = r#"{
            "type": "block_actions",
            "token": "tok",
            "user": {"id": "U1", "username": "someone"},
            "channel": {"id": "C1", "name": "general"},
            "message": {"ts": "5.0", "text": "prompt"},
            "actions": [{
                "type": "multi_static_select",
                "action_id": "multi_static_select_action-language-select",
                "block_id": "b1",
                "selected_options": [
                    {"text": {"type": "plain_text", "text": "English"}, "value": "English"},
                    {"text": {"type": "plain_text", "text": "French"}, "value": "French"}
                ],
                "action_ts": "6.0"
            }]
        }"#;
        let payload: InteractionPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.token(), Some("tok"));
        assert_eq!(
            payload.into_event(),
            Some(Event::Interaction {
                channel_id: "C1".to_string(),
                user_id: "U1".to_string(),
                message_ts: Some("5.0".to_string()),
                actions: vec![BlockAction {
                    action_id: "multi_static_select_action-language-select".to_string(),
                    selected: vec!["English".to_string(), "French".to_string()],
                }],
            })
        );
    }

    #[test]
    fn test_block_actions_without_channel() {
        let json = r#"{"type":"block_actions","user":{"id":"U1"},"actions":[]}"#;
        let payload: InteractionPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.into_event(), None);
    }

    #[test]
    fn test_unsupported_interaction_type() {
        let json = r#"{"type":"view_submission","user":{"id":"U1"}}"#;
        let payload: InteractionPayload = serde_json::from_str(json).unwrap();
        assert!(matches!(payload, InteractionPayload::Unsupported));
    }

    #[test]
    fn test_slash_command_form() {
        let form = SlashCommandForm {
            token: "tok".to_string(),
            command: "/translate".to_string(),
            text: "stop".to_string(),
            channel_id: "C1".to_string(),
            user_id: "U1".to_string(),
        };
        assert_eq!(
            form.into_event(),
            Event::SlashCommand {
                command: "/translate".to_string(),
                text: "stop".to_string(),
                channel_id: "C1".to_string(),
                user_id: "U1".to_string(),
            }
        );
    }
}
