//! Block Kit payload for the language-selection prompt.

use crate::i18n::Language;
use crate::messages;
use serde_json::{json, Value};

/// Action id of the language multi-select. Interactions with any other id are ignored.
pub const LANGUAGE_SELECT_ACTION_ID: &str = "multi_static_select_action-language-select";

/// Section text followed by a two-item multi-select of every detectable
/// language. Common languages are listed first, then the rest by name.
pub fn language_select_blocks() -> Value {
    let mut languages = Language::all();
    languages.sort_by_key(|language| (!language.is_common(), language.name()));

    let options: Vec<Value> = languages
        .iter()
        .map(|language| {
            json!({
                "text": { "type": "plain_text", "text": language.name(), "emoji": true },
                "value": language.name(),
            })
        })
        .collect();

    json!([
        {
            "type": "section",
            "text": { "type": "mrkdwn", "text": messages::LANGUAGE_PROMPT }
        },
        {
            "type": "actions",
            "elements": [
                {
                    "type": "multi_static_select",
                    "placeholder": { "type": "plain_text", "text": "Select languages", "emoji": true },
                    "max_selected_items": 2,
                    "options": options,
                    "action_id": LANGUAGE_SELECT_ACTION_ID
                }
            ]
        }
    ])
}
