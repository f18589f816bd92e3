//! `SpeechSynthesizer` trait and the HTTP-backed `ApiSynthesizer`.
//!
//! Two providers are supported, selected by [`SpeechConfig::provider`]:
//!
//! | Provider   | Endpoint                                   | Voice                  |
//! |------------|--------------------------------------------|------------------------|
//! | OpenAi     | `POST {base}/v1/audio/speech`              | random from the pool   |
//! | ElevenLabs | `POST {base}/v1/text-to-speech/{voice_id}` | fixed identifier       |
//!
//! Both are asked for MP3. The response body is read chunk by chunk into one
//! buffer and then written to disk as an [`AudioArtifact`].

use std::path::Path;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use serde::Serialize;
use thiserror::Error;

use crate::config::{SpeechConfig, SpeechProvider};
use crate::tts::artifact::AudioArtifact;

// ---------------------------------------------------------------------------
// SpeechError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SpeechError {
    /// The provider's credential is not configured.
    #[error("no credential configured (set {0})")]
    MissingCredentials(&'static str),

    /// Nothing to speak.
    #[error("cannot synthesize empty text")]
    EmptyText,

    /// The configured voice pool is empty.
    #[error("no voice available")]
    NoVoice,

    #[error("HTTP request failed: {0}")]
    Request(String),

    #[error("speech request timed out")]
    Timeout,

    #[error("speech API returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// The endpoint answered successfully with zero bytes.
    #[error("speech API returned no audio")]
    EmptyAudio,

    #[error("failed to write audio file: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for SpeechError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SpeechError::Timeout
        } else {
            SpeechError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// SpeechSynthesizer trait
// ---------------------------------------------------------------------------

/// Turns text into an audio file at a caller-chosen path.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str, target: &Path) -> Result<AudioArtifact, SpeechError>;
}

// ---------------------------------------------------------------------------
// VoiceSelection
// ---------------------------------------------------------------------------

/// How the voice for a request is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceSelection {
    /// Uniformly at random from a fixed pool.
    Random(Vec<String>),
    /// Always the same provider-specific identifier.
    Fixed(String),
}

impl VoiceSelection {
    pub fn from_config(config: &SpeechConfig) -> Self {
        match config.provider {
            SpeechProvider::OpenAi => VoiceSelection::Random(config.voice_pool.clone()),
            SpeechProvider::ElevenLabs => VoiceSelection::Fixed(config.voice_id.clone()),
        }
    }

    /// Pick a voice; `None` only for an empty pool or blank identifier.
    pub fn pick(&self) -> Option<&str> {
        match self {
            VoiceSelection::Random(pool) => pool
                .choose(&mut rand::thread_rng())
                .map(String::as_str),
            VoiceSelection::Fixed(id) if !id.trim().is_empty() => Some(id.as_str()),
            VoiceSelection::Fixed(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct OpenAiSpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'a str,
}

#[derive(Debug, Serialize)]
struct ElevenLabsRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    language_code: &'a str,
}

// ---------------------------------------------------------------------------
// ApiSynthesizer
// ---------------------------------------------------------------------------

/// Calls the configured speech-synthesis provider over HTTP.
pub struct ApiSynthesizer {
    client: reqwest::Client,
    config: SpeechConfig,
    voices: VoiceSelection,
}

impl ApiSynthesizer {
    pub fn from_config(config: &SpeechConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
            voices: VoiceSelection::from_config(config),
        }
    }

    fn request(&self, text: &str, voice: &str, key: &str) -> reqwest::RequestBuilder {
        let base = self.config.base_url().trim_end_matches('/');
        let model = self.config.model();

        match self.config.provider {
            SpeechProvider::OpenAi => self
                .client
                .post(format!("{base}/v1/audio/speech"))
                .bearer_auth(key)
                .json(&OpenAiSpeechRequest {
                    model,
                    input: text,
                    voice,
                    response_format: "mp3",
                }),
            SpeechProvider::ElevenLabs => self
                .client
                .post(format!("{base}/v1/text-to-speech/{voice}"))
                .query(&[("output_format", "mp3_44100_128")])
                .header("xi-api-key", key)
                .header(reqwest::header::ACCEPT, "audio/mpeg")
                .json(&ElevenLabsRequest {
                    text,
                    model_id: model,
                    language_code: &self.config.language_code,
                }),
        }
    }

    /// Fetch the audio for `text` into memory.
    pub async fn fetch_audio(&self, text: &str) -> Result<Vec<u8>, SpeechError> {
        let key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(SpeechError::MissingCredentials(
                self.config.provider.credential_var(),
            ))?;

        if text.trim().is_empty() {
            return Err(SpeechError::EmptyText);
        }

        let voice = self.voices.pick().ok_or(SpeechError::NoVoice)?;
        log::debug!(
            "tts: {:?} voice={voice} chars={}",
            self.config.provider,
            text.chars().count()
        );

        let mut response = self.request(text, voice, key).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SpeechError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let mut audio = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            audio.extend_from_slice(&chunk);
        }

        if audio.is_empty() {
            return Err(SpeechError::EmptyAudio);
        }
        Ok(audio)
    }
}

#[async_trait]
impl SpeechSynthesizer for ApiSynthesizer {
    async fn synthesize(&self, text: &str, target: &Path) -> Result<AudioArtifact, SpeechError> {
        let audio = self.fetch_audio(text).await?;
        let artifact = AudioArtifact::write(target, &audio).await?;
        log::info!(
            "tts: wrote {} bytes to {}",
            artifact.size_bytes(),
            artifact.path().display()
        );
        Ok(artifact)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn openai_config(server: &MockServer) -> SpeechConfig {
        SpeechConfig {
            provider: SpeechProvider::OpenAi,
            base_url: Some(server.uri()),
            api_key: Some("sk-test".into()),
            voice_pool: vec!["nova".into()],
            timeout_secs: 5,
            ..SpeechConfig::default()
        }
    }

    fn elevenlabs_config(server: &MockServer) -> SpeechConfig {
        SpeechConfig {
            provider: SpeechProvider::ElevenLabs,
            base_url: Some(server.uri()),
            api_key: Some("xi-test".into()),
            voice_id: "voice123".into(),
            language_code: "fr".into(),
            timeout_secs: 5,
            ..SpeechConfig::default()
        }
    }

    // -----------------------------------------------------------------------
    // VoiceSelection
    // -----------------------------------------------------------------------

    #[test]
    fn random_pick_stays_within_pool() {
        let pool = vec!["alloy".to_string(), "echo".to_string(), "nova".to_string()];
        let selection = VoiceSelection::Random(pool.clone());
        for _ in 0..50 {
            let voice = selection.pick().unwrap();
            assert!(pool.iter().any(|v| v == voice));
        }
    }

    #[test]
    fn empty_pool_and_blank_id_pick_nothing() {
        assert!(VoiceSelection::Random(Vec::new()).pick().is_none());
        assert!(VoiceSelection::Fixed("  ".into()).pick().is_none());
    }

    #[test]
    fn provider_decides_selection_mode() {
        let mut cfg = SpeechConfig::default();
        assert!(matches!(
            VoiceSelection::from_config(&cfg),
            VoiceSelection::Random(_)
        ));
        cfg.provider = SpeechProvider::ElevenLabs;
        cfg.voice_id = "abc".into();
        assert_eq!(
            VoiceSelection::from_config(&cfg),
            VoiceSelection::Fixed("abc".into())
        );
    }

    // -----------------------------------------------------------------------
    // ApiSynthesizer
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn openai_audio_is_written_to_target() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/audio/speech"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({
                "model": "tts-1",
                "input": "Le chat dort",
                "voice": "nova",
                "response_format": "mp3"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ID3audio".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempdir().expect("temp dir");
        let target = dir.path().join("speech_files").join("Le-chat-dort.mp3");

        let synth = ApiSynthesizer::from_config(&openai_config(&server));
        let artifact = synth.synthesize("Le chat dort", &target).await.unwrap();

        assert_eq!(artifact.size_bytes(), 8);
        assert_eq!(std::fs::read(&target).unwrap(), b"ID3audio");
    }

    #[tokio::test]
    async fn elevenlabs_uses_fixed_voice_and_language_hint() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/text-to-speech/voice123"))
            .and(query_param("output_format", "mp3_44100_128"))
            .and(header("xi-api-key", "xi-test"))
            .and(body_partial_json(serde_json::json!({
                "text": "Bonjour",
                "model_id": "eleven_turbo_v2_5",
                "language_code": "fr"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8; 2048]))
            .expect(1)
            .mount(&server)
            .await;

        let synth = ApiSynthesizer::from_config(&elevenlabs_config(&server));
        let audio = synth.fetch_audio("Bonjour").await.unwrap();
        assert_eq!(audio.len(), 2048);
    }

    #[tokio::test]
    async fn missing_key_fails_without_request_or_file() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"x".to_vec()))
            .expect(0)
            .mount(&server)
            .await;

        let mut cfg = openai_config(&server);
        cfg.api_key = None;

        let dir = tempdir().expect("temp dir");
        let target = dir.path().join("out.mp3");

        let synth = ApiSynthesizer::from_config(&cfg);
        let result = synth.synthesize("Bonjour", &target).await;

        assert!(matches!(
            result,
            Err(SpeechError::MissingCredentials("OPENAI_API_KEY"))
        ));
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn api_error_leaves_no_file() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/audio/speech"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let dir = tempdir().expect("temp dir");
        let target = dir.path().join("out.mp3");

        let synth = ApiSynthesizer::from_config(&openai_config(&server));
        let result = synth.synthesize("Bonjour", &target).await;

        assert!(matches!(result, Err(SpeechError::Api { status: 429, .. })));
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn empty_body_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/audio/speech"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let synth = ApiSynthesizer::from_config(&openai_config(&server));
        assert!(matches!(
            synth.fetch_audio("Bonjour").await,
            Err(SpeechError::EmptyAudio)
        ));
    }

    #[tokio::test]
    async fn empty_text_is_rejected() {
        let server = MockServer::start().await;
        let synth = ApiSynthesizer::from_config(&openai_config(&server));
        assert!(matches!(
            synth.fetch_audio("  ").await,
            Err(SpeechError::EmptyText)
        ));
    }
}
