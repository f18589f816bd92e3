//! Flashcard run orchestration.
//!
//! This module wires classification, text generation, speech synthesis and
//! flashcard publishing into a single invocation.
//!
//! # Architecture
//!
//! ```text
//! TargetInput (text + difficulty)
//!        │
//!        ▼
//! RunController::run()
//!        │
//!        ├─ SentencePipeline::generate   → sentence, definition?, translation?
//!        ├─ SpeechSynthesizer::synthesize → AudioArtifact in speech_dir
//!        └─ NoteBuilder + FlashcardPublisher → primary (+ bilingual) note
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use vocab_cards::config::AppConfig;
//! use vocab_cards::pipeline::RunController;
//! use vocab_cards::text::{Difficulty, TargetInput};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut config = AppConfig::load()?;
//!     config.apply_env();
//!     config.validate()?;
//!
//!     let mut controller = RunController::from_config(&config, false);
//!     let outcome = controller
//!         .run(TargetInput::new("chat", Difficulty::A2))
//!         .await?;
//!     println!("{}", outcome.bundle.sentence);
//!     Ok(())
//! }
//! ```

pub mod runner;
pub mod sentence;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use runner::{PipelineError, RunController, RunOutcome};
pub use sentence::{SentenceBundle, SentencePipeline, TokenLimits};
pub use state::{RunState, RunStep};
