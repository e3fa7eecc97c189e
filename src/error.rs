use crate::messages;

/// Errors raised by the translation core.
///
/// `NotConfigured` is the normal outcome for channels that never enabled
/// auto-translation and is absorbed by the router. The remaining kinds are
/// reported to the triggering user through [`BotError::user_message`].
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error("invalid language selected: '{0}'")]
    InvalidLanguage(String),

    #[error("channel {0} is not configured for auto-translation")]
    NotConfigured(String),

    #[error("flag '{0}' has no associated language")]
    UnsupportedFlag(String),

    #[error("unable to detect the language of the text")]
    UnknownLanguage,

    #[error("internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

impl BotError {
    /// Fixed, user-facing text for this error kind.
    ///
    /// Collaborator details never appear here; they are logged instead.
    pub fn user_message(&self) -> String {
        match self {
            BotError::InvalidLanguage(_) => messages::ERR_INVALID_LANGUAGE.to_string(),
            BotError::NotConfigured(_) => messages::ERR_NOT_CONFIGURED.to_string(),
            BotError::UnsupportedFlag(flag) => {
                messages::ERR_UNSUPPORTED_FLAG.replace("{flag}", flag)
            }
            BotError::UnknownLanguage => messages::ERR_UNKNOWN_LANGUAGE.to_string(),
            BotError::Internal(_) => messages::ERR_INTERNAL.to_string(),
        }
    }
}
