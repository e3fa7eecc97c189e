use anyhow::{Context, Result};
use std::time::Duration;

use crate::dedup::{DEFAULT_SWEEP_INTERVAL, DEFAULT_TTL};
use crate::detect::DEFAULT_DETECTION_THRESHOLD;

#[derive(Debug, Clone)]
pub struct Config {
    // Slack
    pub slack_bot_token: String,
    pub slack_verification_token: String,
    pub slack_api_url: String,

    // OpenAI
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_api_url: String,
    pub translation_timeout: Duration,

    // Detection and dedup
    pub detection_threshold: f64,
    pub dedup_ttl: Duration,
    pub dedup_sweep_interval: Duration,

    // Persistence: postgres:// URL, directory path, or empty for none
    pub datastore_path: String,

    // Server
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // Slack
            slack_bot_token: std::env::var("SLACK_BOT_TOKEN")
                .context("SLACK_BOT_TOKEN not set")?,
            slack_verification_token: std::env::var("SLACK_VERIFICATION_TOKEN")
                .context("SLACK_VERIFICATION_TOKEN not set")?,
            slack_api_url: std::env::var("SLACK_API_URL")
                .unwrap_or_else(|_| "https://slack.com/api".to_string()),

            // OpenAI
            openai_api_key: std::env::var("OPENAI_API_KEY")
                .context("OPENAI_API_KEY not set")?,
            openai_model: std::env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            openai_api_url: std::env::var("OPENAI_API_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string()),
            translation_timeout: std::env::var("TRANSLATION_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|secs: &u64| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(Duration::from_secs(60)),

            // Detection and dedup
            detection_threshold: std::env::var("DETECTION_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|t: &f64| (0.0..=1.0).contains(t))
                .unwrap_or(DEFAULT_DETECTION_THRESHOLD),
            dedup_ttl: std::env::var("DEDUP_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TTL),
            dedup_sweep_interval: std::env::var("DEDUP_SWEEP_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|secs: &u64| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_SWEEP_INTERVAL),

            // Persistence
            datastore_path: std::env::var("DATASTORE_PATH").unwrap_or_default(),

            // Server
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const ALL_VARS: &[&str] = &[
        "SLACK_BOT_TOKEN",
        "SLACK_VERIFICATION_TOKEN",
        "SLACK_API_URL",
        "OPENAI_API_KEY",
        "OPENAI_MODEL",
        "OPENAI_API_URL",
        "TRANSLATION_TIMEOUT_SECS",
        "DETECTION_THRESHOLD",
        "DEDUP_TTL_SECS",
        "DEDUP_SWEEP_SECS",
        "DATASTORE_PATH",
        "PORT",
    ];

    fn clear_env() {
        for var in ALL_VARS {
            std::env::remove_var(var);
        }
    }

    fn set_required() {
        std::env::set_var("SLACK_BOT_TOKEN", "xoxb-test");
        std::env::set_var("SLACK_VERIFICATION_TOKEN", "verify-me");
        std::env::set_var("OPENAI_API_KEY", "sk-test");
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        set_required();

        let config = Config::from_env().unwrap();
        assert_eq!(config.slack_bot_token, "xoxb-test");
        assert_eq!(config.slack_api_url, "https://slack.com/api");
        assert_eq!(config.openai_model, "gpt-4o-mini");
        assert_eq!(config.translation_timeout, Duration::from_secs(60));
        assert_eq!(config.detection_threshold, 0.5);
        assert_eq!(config.dedup_ttl, Duration::from_secs(300));
        assert_eq!(config.dedup_sweep_interval, Duration::from_secs(600));
        assert_eq!(config.datastore_path, "");
        assert_eq!(config.port, 8080);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_overrides() {
        clear_env();
        set_required();
        std::env::set_var("TRANSLATION_TIMEOUT_SECS", "5");
        std::env::set_var("DETECTION_THRESHOLD", "0.8");
        std::env::set_var("DEDUP_TTL_SECS", "30");
        std::env::set_var("DATASTORE_PATH", "/var/lib/translator");
        std::env::set_var("PORT", "3000");

        let config = Config::from_env().unwrap();
        assert_eq!(config.translation_timeout, Duration::from_secs(5));
        assert_eq!(config.detection_threshold, 0.8);
        assert_eq!(config.dedup_ttl, Duration::from_secs(30));
        assert_eq!(config.datastore_path, "/var/lib/translator");
        assert_eq!(config.port, 3000);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_values_fall_back_to_defaults() {
        clear_env();
        set_required();
        std::env::set_var("DETECTION_THRESHOLD", "1.5");
        std::env::set_var("DEDUP_SWEEP_SECS", "0");
        std::env::set_var("TRANSLATION_TIMEOUT_SECS", "0");
        std::env::set_var("PORT", "not-a-port");

        let config = Config::from_env().unwrap();
        assert_eq!(config.detection_threshold, 0.5);
        assert_eq!(config.translation_timeout, Duration::from_secs(60));
        assert_eq!(config.dedup_sweep_interval, Duration::from_secs(600));
        assert_eq!(config.port, 8080);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_missing_required_variable() {
        clear_env();
        std::env::set_var("SLACK_BOT_TOKEN", "xoxb-test");
        std::env::set_var("OPENAI_API_KEY", "sk-test");

        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("SLACK_VERIFICATION_TOKEN not set"));

        clear_env();
    }
}
