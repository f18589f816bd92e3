//! Speech synthesis for flashcard audio.
//!
//! # Architecture
//!
//! ```text
//! sentence ──▶ audio_path(speech_dir, sentence)
//!     │                     │
//!     ▼                     ▼
//! SpeechSynthesizer::synthesize(text, path)
//!     │  ApiSynthesizer: pick voice → POST provider → collect chunks
//!     ▼
//! AudioArtifact (written once, attached to the note)
//! ```

pub mod artifact;
pub mod synthesizer;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use artifact::{audio_file_name, audio_path, AudioArtifact, AUDIO_EXTENSION};
pub use synthesizer::{ApiSynthesizer, SpeechError, SpeechSynthesizer, VoiceSelection};
