//! Text generation for flashcards.
//!
//! This module provides:
//! * [`TextGenerator`]: async trait implemented by all generation backends.
//! * [`ApiGenerator`]: OpenAI-compatible chat-completions client.
//! * [`PromptBuilder`]: fills the configured `<placeholder>` templates.
//! * [`cleanup`]: trailing-period and translation post-processing.
//! * [`LlmError`] / [`PromptError`]: error variants for the above.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use vocab_cards::config::AppConfig;
//! use vocab_cards::llm::{ApiGenerator, PromptBuilder, TextGenerator};
//! use vocab_cards::text::{Difficulty, TargetInput};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let generator = ApiGenerator::from_config(&config.llm);
//!     let prompts = PromptBuilder::new(&config.prompts, &config.language);
//!
//!     let input = TargetInput::new("chat", Difficulty::A2);
//!     let prompt = prompts.sentence_prompt(&input).unwrap();
//!     let sentence = generator.complete(&prompt, 100).await.unwrap();
//!     println!("{sentence}");
//! }
//! ```

pub mod cleanup;
pub mod client;
pub mod prompt;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use client::{ApiGenerator, LlmError, TextGenerator};
pub use prompt::{PromptBuilder, PromptError, PromptPurpose};
