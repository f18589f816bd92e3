//! Application settings structs, defaults, environment overrides and TOML
//! persistence.
//!
//! All structs implement `Deserialize`, `Default` and `Clone` so a partial
//! TOML file fills in the rest and each component gets its own copy at
//! construction time.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::paths::settings_file;
use crate::llm::prompt::{check_template, PromptError, PromptPurpose};
use crate::text::Difficulty;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Reasons a configuration is rejected at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A prompt template is empty or references an unknown placeholder.
    #[error(transparent)]
    Prompt(#[from] PromptError),

    /// A credential required by the selected provider is absent.
    #[error("missing credential: set {0}")]
    MissingCredential(&'static str),

    /// Any other unusable value.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

// ---------------------------------------------------------------------------
// LanguageConfig
// ---------------------------------------------------------------------------

/// The language being learned and the learner's own language.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageConfig {
    /// Language the example sentences are written in (e.g. `"French"`).
    pub target_language: String,
    /// Language definitions and translations are written in.
    pub native_language: String,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            target_language: "French".into(),
            native_language: "English".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// PromptTemplates
// ---------------------------------------------------------------------------

/// One template per prompt purpose.
///
/// Placeholders are written as `<name>`; see
/// [`PromptPurpose::allowed_placeholders`] for the set each template accepts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptTemplates {
    pub word_sentence_a2: String,
    pub word_sentence_b1: String,
    pub word_sentence_b2: String,
    pub phrase_sentence: String,
    pub definition: String,
    pub translation: String,
}

impl PromptTemplates {
    /// The raw template configured for `purpose`.
    pub fn for_purpose(&self, purpose: PromptPurpose) -> &str {
        match purpose {
            PromptPurpose::WordSentence(Difficulty::A2) => &self.word_sentence_a2,
            PromptPurpose::WordSentence(Difficulty::B1) => &self.word_sentence_b1,
            PromptPurpose::WordSentence(Difficulty::B2) => &self.word_sentence_b2,
            PromptPurpose::PhraseSentence => &self.phrase_sentence,
            PromptPurpose::Definition => &self.definition,
            PromptPurpose::Translation => &self.translation,
        }
    }
}

impl Default for PromptTemplates {
    fn default() -> Self {
        let word = |extra: &str| {
            format!(
                "Write one natural <target_language> sentence for a <level> learner \
                 that uses the word \"<target>\". {extra} \
                 Reply with only the sentence, without quotes or explanation."
            )
        };

        Self {
            word_sentence_a2: word("Use short, common words and the present tense."),
            word_sentence_b1: word("Use everyday vocabulary and at most one subordinate clause."),
            word_sentence_b2: word("Use varied vocabulary and a natural, idiomatic structure."),
            phrase_sentence: "Write one natural <target_language> sentence at level <level> \
                              that contains the expression \"<target>\" exactly as written. \
                              Reply with only the sentence, without quotes or explanation."
                .into(),
            definition: "Give a short <native_language> definition of the <target_language> \
                         expression \"<target>\". Reply with only the definition."
                .into(),
            translation: "Translate this <target_language> sentence into natural \
                          <native_language>: <sentence>\nReply with only the translation."
                .into(),
        }
    }
}

// ---------------------------------------------------------------------------
// LlmConfig
// ---------------------------------------------------------------------------

/// Selects which text-generation backend is called.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LlmProvider {
    /// api.openai.com; requires an API key.
    OpenAi,
    /// Any OpenAI-compatible REST API (Ollama, LM Studio, vLLM …); the key is
    /// optional.
    OpenAiCompatible,
}

impl Default for LlmProvider {
    fn default() -> Self {
        Self::OpenAi
    }
}

/// Settings for the text-generation step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Which backend to use.
    pub provider: LlmProvider,
    /// Base URL of the API endpoint (`/v1/chat/completions` is appended).
    pub base_url: String,
    /// Bearer credential, `None` for local providers.
    pub api_key: Option<String>,
    /// Model identifier sent to the API.
    pub model: String,
    /// Token cap for the example sentence.
    pub sentence_max_tokens: u32,
    /// Token cap for the definition.
    pub definition_max_tokens: u32,
    /// Token cap for the translation.
    pub translation_max_tokens: u32,
    /// Maximum seconds to wait for a response.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            base_url: "https://api.openai.com".into(),
            api_key: None,
            model: "gpt-4o-mini".into(),
            sentence_max_tokens: 100,
            definition_max_tokens: 150,
            translation_max_tokens: 100,
            timeout_secs: 60,
        }
    }
}

// ---------------------------------------------------------------------------
// SpeechConfig
// ---------------------------------------------------------------------------

/// Selects which speech-synthesis backend is called.
///
/// | Variant    | Voice                               | Credential env var   |
/// |------------|-------------------------------------|----------------------|
/// | OpenAi     | random pick from `voice_pool`       | `OPENAI_API_KEY`     |
/// | ElevenLabs | fixed `voice_id`                    | `ELEVENLABS_API_KEY` |
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SpeechProvider {
    OpenAi,
    ElevenLabs,
}

impl SpeechProvider {
    /// Environment variable holding this provider's credential.
    pub fn credential_var(&self) -> &'static str {
        match self {
            SpeechProvider::OpenAi => "OPENAI_API_KEY",
            SpeechProvider::ElevenLabs => "ELEVENLABS_API_KEY",
        }
    }

    /// Base URL used when `SpeechConfig::base_url` is not set.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            SpeechProvider::OpenAi => "https://api.openai.com",
            SpeechProvider::ElevenLabs => "https://api.elevenlabs.io",
        }
    }

    /// Model used when `SpeechConfig::model` is not set.
    pub fn default_model(&self) -> &'static str {
        match self {
            SpeechProvider::OpenAi => "tts-1",
            SpeechProvider::ElevenLabs => "eleven_turbo_v2_5",
        }
    }
}

impl Default for SpeechProvider {
    fn default() -> Self {
        Self::OpenAi
    }
}

/// Settings for the speech-synthesis step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub provider: SpeechProvider,
    /// Overrides the provider's default base URL.
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    /// Overrides the provider's default model.
    pub model: Option<String>,
    /// Voices picked from uniformly at random (OpenAI).
    pub voice_pool: Vec<String>,
    /// Fixed voice identifier (ElevenLabs).
    pub voice_id: String,
    /// ISO-639-1 hint for the spoken language.
    pub language_code: String,
    pub timeout_secs: u64,
}

impl SpeechConfig {
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base_url())
    }

    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            provider: SpeechProvider::default(),
            base_url: None,
            api_key: None,
            model: None,
            voice_pool: ["alloy", "echo", "fable", "nova", "onyx", "shimmer"]
                .into_iter()
                .map(String::from)
                .collect(),
            voice_id: "XB0fDUnXU5powFXDhCwa".into(),
            language_code: "fr".into(),
            timeout_secs: 60,
        }
    }
}

// ---------------------------------------------------------------------------
// AnkiConfig
// ---------------------------------------------------------------------------

/// Settings for the AnkiConnect flashcard store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnkiConfig {
    /// AnkiConnect endpoint.
    pub url: String,
    /// AnkiConnect API version sent in every envelope.
    pub version: u8,
    /// Deck receiving the primary note.
    pub deck: String,
    /// Deck receiving the bilingual companion note; `None` disables it.
    pub bilingual_deck: Option<String>,
    /// Note type used for both notes.
    pub model_name: String,
    pub front_field: String,
    pub back_field: String,
    /// Field the audio attachment is placed in.
    pub audio_field: String,
    /// Tags added to every note.
    pub tags: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for AnkiConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8765".into(),
            version: 6,
            deck: "Vocab".into(),
            bilingual_deck: None,
            model_name: "Basic".into(),
            front_field: "Front".into(),
            back_field: "Back".into(),
            audio_field: "Back".into(),
            tags: vec!["vocab-cards".into()],
            timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// OutputConfig
// ---------------------------------------------------------------------------

/// Local filesystem output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory synthesized audio is written to (created on demand).
    pub speech_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            speech_dir: PathBuf::from("speech_files"),
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// Built once in `main` and passed by reference to each component's
/// constructor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub language: LanguageConfig,
    pub prompts: PromptTemplates,
    pub llm: LlmConfig,
    pub speech: SpeechConfig,
    pub anki: AnkiConfig,
    pub output: OutputConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&settings_file())
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value.
    ///
    /// Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("TARGET_LANGUAGE") {
            self.language.target_language = v;
        }
        if let Some(v) = get("NATIVE_LANGUAGE") {
            self.language.native_language = v;
        }
        if let Some(v) = get("PROMPT_A2") {
            self.prompts.word_sentence_a2 = v;
        }
        if let Some(v) = get("PROMPT_B1") {
            self.prompts.word_sentence_b1 = v;
        }
        if let Some(v) = get("PROMPT_B2") {
            self.prompts.word_sentence_b2 = v;
        }
        if let Some(v) = get("WORD_DEFINITION_PROMPT") {
            self.prompts.definition = v;
        }
        if let Some(v) = get("PHRASE_SENTENCE_PROMPT") {
            self.prompts.phrase_sentence = v;
        }
        if let Some(v) = get("TRANSLATION_PROMPT") {
            self.prompts.translation = v;
        }
        if let Some(v) = get("OPENAI_API_KEY") {
            self.llm.api_key = Some(v);
        }
        if let Some(v) = get(self.speech.provider.credential_var()) {
            self.speech.api_key = Some(v);
        }
        if let Some(v) = get("ANKI_CONNECT_URL") {
            self.anki.url = v;
        }
    }

    /// Reject configurations that cannot complete a run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.language.target_language.trim().is_empty()
            || self.language.native_language.trim().is_empty()
        {
            return Err(ConfigError::Invalid(
                "target and native language must both be set".into(),
            ));
        }

        for purpose in PromptPurpose::all() {
            check_template(purpose, self.prompts.for_purpose(purpose))?;
        }

        if self.llm.provider == LlmProvider::OpenAi && !has_value(&self.llm.api_key) {
            return Err(ConfigError::MissingCredential("OPENAI_API_KEY"));
        }

        if !has_value(&self.speech.api_key) {
            return Err(ConfigError::MissingCredential(
                self.speech.provider.credential_var(),
            ));
        }
        match self.speech.provider {
            SpeechProvider::OpenAi if self.speech.voice_pool.is_empty() => {
                return Err(ConfigError::Invalid("speech.voice_pool is empty".into()));
            }
            SpeechProvider::ElevenLabs if self.speech.voice_id.trim().is_empty() => {
                return Err(ConfigError::Invalid("speech.voice_id is empty".into()));
            }
            _ => {}
        }

        if self.anki.deck.trim().is_empty() {
            return Err(ConfigError::Invalid("anki.deck is empty".into()));
        }

        Ok(())
    }
}

fn has_value(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn with_credentials() -> AppConfig {
        let mut cfg = AppConfig::default();
        cfg.llm.api_key = Some("sk-test".into());
        cfg.speech.api_key = Some("sk-test".into());
        cfg
    }

    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let mut original = with_credentials();
        original.language.target_language = "Spanish".into();
        original.anki.bilingual_deck = Some("Vocab::Bilingual".into());
        original.speech.provider = SpeechProvider::ElevenLabs;
        std::fs::write(&path, toml::to_string_pretty(&original).expect("serialize"))
            .expect("write");

        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.language.target_language, "Spanish");
        assert_eq!(loaded.prompts.translation, original.prompts.translation);
        assert_eq!(loaded.llm.model, original.llm.model);
        assert_eq!(loaded.llm.api_key, Some("sk-test".into()));
        assert_eq!(loaded.speech.provider, SpeechProvider::ElevenLabs);
        assert_eq!(loaded.speech.voice_pool, original.speech.voice_pool);
        assert_eq!(loaded.anki.bilingual_deck, Some("Vocab::Bilingual".into()));
        assert_eq!(loaded.output.speech_dir, PathBuf::from("speech_files"));
    }

    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        assert_eq!(config.anki.url, "http://127.0.0.1:8765");
        assert_eq!(config.language.target_language, "French");
    }

    #[test]
    fn partial_file_fills_remaining_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("partial.toml");
        std::fs::write(&path, "[anki]\ndeck = \"French::Words\"\n").expect("write");

        let config = AppConfig::load_from(&path).expect("load");
        assert_eq!(config.anki.deck, "French::Words");
        assert_eq!(config.anki.version, 6);
        assert_eq!(config.llm.model, "gpt-4o-mini");
    }

    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.llm.base_url, "https://api.openai.com");
        assert!(cfg.llm.api_key.is_none());
        assert_eq!(cfg.speech.provider, SpeechProvider::OpenAi);
        assert_eq!(cfg.speech.base_url(), "https://api.openai.com");
        assert_eq!(cfg.speech.model(), "tts-1");
        assert_eq!(cfg.speech.voice_pool.len(), 6);
        assert_eq!(cfg.anki.model_name, "Basic");
        assert!(cfg.anki.bilingual_deck.is_none());
    }

    // -----------------------------------------------------------------------
    // Overrides
    // -----------------------------------------------------------------------

    #[test]
    fn overrides_replace_languages_templates_and_keys() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("TARGET_LANGUAGE", "German"),
            ("NATIVE_LANGUAGE", "Dutch"),
            ("PROMPT_B1", "B1 sentence with <target>"),
            ("TRANSLATION_PROMPT", "Translate <sentence>"),
            ("OPENAI_API_KEY", "sk-env"),
            ("ANKI_CONNECT_URL", "http://anki.local:8765"),
        ]);

        let mut cfg = AppConfig::default();
        cfg.apply_overrides(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(cfg.language.target_language, "German");
        assert_eq!(cfg.language.native_language, "Dutch");
        assert_eq!(cfg.prompts.word_sentence_b1, "B1 sentence with <target>");
        assert_eq!(cfg.prompts.translation, "Translate <sentence>");
        assert_eq!(cfg.llm.api_key.as_deref(), Some("sk-env"));
        // OpenAI speech shares the generation key.
        assert_eq!(cfg.speech.api_key.as_deref(), Some("sk-env"));
        assert_eq!(cfg.anki.url, "http://anki.local:8765");
    }

    #[test]
    fn elevenlabs_key_is_read_from_its_own_variable() {
        let mut cfg = AppConfig::default();
        cfg.speech.provider = SpeechProvider::ElevenLabs;
        cfg.apply_overrides(|k| match k {
            "OPENAI_API_KEY" => Some("sk-openai".into()),
            "ELEVENLABS_API_KEY" => Some("xi-key".into()),
            _ => None,
        });

        assert_eq!(cfg.llm.api_key.as_deref(), Some("sk-openai"));
        assert_eq!(cfg.speech.api_key.as_deref(), Some("xi-key"));
    }

    #[test]
    fn empty_override_is_ignored() {
        let mut cfg = AppConfig::default();
        cfg.apply_overrides(|k| (k == "TARGET_LANGUAGE").then(|| "  ".to_string()));
        assert_eq!(cfg.language.target_language, "French");
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    #[test]
    fn defaults_with_credentials_validate() {
        assert!(with_credentials().validate().is_ok());
    }

    #[test]
    fn missing_generation_key_is_rejected() {
        let mut cfg = with_credentials();
        cfg.llm.api_key = None;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::MissingCredential("OPENAI_API_KEY"))
        ));
    }

    #[test]
    fn compatible_provider_needs_no_generation_key() {
        let mut cfg = with_credentials();
        cfg.llm.provider = LlmProvider::OpenAiCompatible;
        cfg.llm.api_key = None;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn missing_speech_key_names_provider_variable() {
        let mut cfg = with_credentials();
        cfg.speech.provider = SpeechProvider::ElevenLabs;
        cfg.speech.api_key = Some(String::new());
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::MissingCredential("ELEVENLABS_API_KEY"))
        ));
    }

    #[test]
    fn empty_template_is_rejected() {
        let mut cfg = with_credentials();
        cfg.prompts.definition = "   ".into();
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Prompt(PromptError::MissingTemplate("definition")))
        ));
    }

    #[test]
    fn unknown_placeholder_is_rejected() {
        let mut cfg = with_credentials();
        cfg.prompts.translation = "Translate <sentence> for <audience>".into();
        match cfg.validate() {
            Err(ConfigError::Prompt(PromptError::UnresolvedPlaceholder { placeholder, .. })) => {
                assert_eq!(placeholder, "audience");
            }
            other => panic!("expected unresolved placeholder, got {other:?}"),
        }
    }

    #[test]
    fn empty_voice_pool_is_rejected() {
        let mut cfg = with_credentials();
        cfg.speech.voice_pool.clear();
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }
}
