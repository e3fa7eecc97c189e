pub mod bot;
pub mod channels;
pub mod config;
pub mod dedup;
pub mod detect;
pub mod error;
pub mod flags;
pub mod i18n;
pub mod messages;
pub mod metrics;
pub mod retry;
pub mod scheduler;
pub mod security;
pub mod server;
pub mod slack;
pub mod store;
pub mod translation;
