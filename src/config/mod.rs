//! Configuration module for the flashcard generator.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for each external
//! service, the platform settings path, TOML loading via `AppConfig::load` /
//! `AppConfig::load_from`, environment overrides and the
//! startup validation that rejects incomplete configurations.

pub mod paths;
pub mod settings;

pub use paths::settings_file;
pub use settings::{
    AnkiConfig, AppConfig, ConfigError, LanguageConfig, LlmConfig, LlmProvider, OutputConfig,
    PromptTemplates, SpeechConfig, SpeechProvider,
};
