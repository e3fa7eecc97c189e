//! Detectable languages.
//!
//! - `registry`: the static table of languages the detector can identify
//! - `language`: the validated `Language` handle built from that table
//!
//! Flag reactions may target languages outside this table (the translator
//! accepts free-form names); only detection and channel pairs are limited
//! to registry languages.

mod language;
mod registry;

pub use language::Language;
pub use registry::{LanguageConfig, LanguageRegistry};
