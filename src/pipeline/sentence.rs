//! Sentence pipeline: example sentence, definition and translation.
//!
//! The sentence is mandatory; without it there is nothing to translate,
//! speak or publish. Definition and translation are best-effort: a failure is
//! logged and the card is built without that block.

use std::sync::Arc;

use crate::config::LlmConfig;
use crate::llm::{LlmError, PromptBuilder, TextGenerator};
use crate::text::TargetInput;

use super::runner::PipelineError;

/// Token caps per request kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLimits {
    pub sentence: u32,
    pub definition: u32,
    pub translation: u32,
}

impl From<&LlmConfig> for TokenLimits {
    fn from(config: &LlmConfig) -> Self {
        Self {
            sentence: config.sentence_max_tokens,
            definition: config.definition_max_tokens,
            translation: config.translation_max_tokens,
        }
    }
}

/// Generated text for one card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentenceBundle {
    /// Example sentence in the target language; never empty.
    pub sentence: String,
    pub definition: Option<String>,
    pub translation: Option<String>,
}

pub struct SentencePipeline {
    llm: Arc<dyn TextGenerator>,
    prompts: PromptBuilder,
    limits: TokenLimits,
}

impl SentencePipeline {
    pub fn new(llm: Arc<dyn TextGenerator>, prompts: PromptBuilder, limits: TokenLimits) -> Self {
        Self {
            llm,
            prompts,
            limits,
        }
    }

    /// Generate the sentence, then the definition, then the translation of
    /// the sentence.
    pub async fn generate(&self, input: &TargetInput) -> Result<SentenceBundle, PipelineError> {
        let prompt = self.prompts.sentence_prompt(input)?;
        let sentence = self
            .llm
            .complete(&prompt, self.limits.sentence)
            .await
            .map_err(PipelineError::Generation)?;
        log::info!("sentence: {sentence}");

        let prompt = self.prompts.definition_prompt(input.text())?;
        let definition = best_effort(
            "definition",
            self.llm.complete(&prompt, self.limits.definition).await,
        );

        let prompt = self.prompts.translation_prompt(&sentence)?;
        let translation = best_effort(
            "translation",
            self.llm.translate(&prompt, self.limits.translation).await,
        );

        Ok(SentenceBundle {
            sentence,
            definition,
            translation,
        })
    }
}

fn best_effort(what: &str, result: Result<String, LlmError>) -> Option<String> {
    match result {
        Ok(text) => {
            log::info!("{what}: {text}");
            Some(text)
        }
        Err(e) => {
            log::warn!("{what} generation failed, continuing without it: {e}");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
