//! User-facing strings posted by the bot.
//!
//! Placeholders use `{name}` syntax and are filled with `str::replace`.

pub const ERR_INTERNAL: &str = "An unexpected error occurred; please try again later!";

/// Placeholders: {flag}
pub const ERR_UNSUPPORTED_FLAG: &str = "Sorry, the flag '{flag}' is not supported!";

pub const ERR_UNKNOWN_LANGUAGE: &str =
    "Sorry, we are unable to detect the language of provided text";

pub const ERR_INVALID_LANGUAGE: &str =
    "Sorry, one of the selected languages is not supported for auto-translation.";

pub const ERR_NOT_CONFIGURED: &str = "Auto-translation is not configured for this channel.";

/// Placeholders: {l1}, {l2}
pub const AUTO_TRANSLATION_ACTIVATED: &str = "Auto-translation activated: {l1}  ↔  {l2}";

/// Placeholders: {l1}, {l2}
pub const AUTO_TRANSLATION_ALREADY_ACTIVE: &str = "Auto-translation already active: {l1}  ↔  {l2}";

pub const AUTO_TRANSLATION_STOPPED: &str = "Stopping auto-translation!";

pub const SELECT_TWO_LANGUAGES: &str = "Please select 2 languages.";

pub const LANGUAGE_PROMPT: &str = "Select two languages to automatically translate between:";

pub const HELP: &str = "\
*Translator Help*
Please see below for a list of available commands:

• /help → Display this help message.

• /translate → Automatically detect and translate between the specified languages.

• /translate stop → Stop auto-translation.

• flag emoji → React to any message with a flag emoji (🇺🇸) and the bot will reply with a translation into that flag's language.";
