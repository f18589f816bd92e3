//! Run controller: classify, generate, synthesize, publish.
//!
//! [`RunController`] drives one invocation end to end. Only the example
//! sentence is essential; every later step degrades instead of failing:
//!
//! ```text
//! TargetInput
//!   └─▶ classify                                   [Classifying]
//!   └─▶ SentencePipeline::generate                 [Generating]
//!         └─ Err → Failed (no audio, no note)
//!   └─▶ SpeechSynthesizer::synthesize              [Synthesizing]
//!         └─ Err → warn, Done (no note)
//!   └─▶ FlashcardPublisher::ensure_and_publish     [Publishing]
//!         └─ rejected → logged, Done
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::anki::{AnkiConnectClient, CardContent, FlashcardPublisher, NoteBuilder};
use crate::config::AppConfig;
use crate::llm::{ApiGenerator, LlmError, PromptBuilder, PromptError};
use crate::text::{InputKind, TargetInput};
use crate::tts::{audio_path, ApiSynthesizer, AudioArtifact, SpeechSynthesizer};

use super::sentence::{SentenceBundle, SentencePipeline, TokenLimits};
use super::state::{RunState, RunStep};

// ---------------------------------------------------------------------------
// PipelineError
// ---------------------------------------------------------------------------

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Prompt(#[from] PromptError),

    /// No example sentence could be produced.
    #[error("sentence generation failed: {0}")]
    Generation(#[source] LlmError),
}

// ---------------------------------------------------------------------------
// RunOutcome
// ---------------------------------------------------------------------------

/// What a finished run produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub kind: InputKind,
    pub bundle: SentenceBundle,
    /// `None` when synthesis failed.
    pub audio: Option<AudioArtifact>,
    /// Decks that accepted a note.
    pub published: Vec<String>,
}

// ---------------------------------------------------------------------------
// RunController
// ---------------------------------------------------------------------------

pub struct RunController {
    sentences: SentencePipeline,
    speech: Arc<dyn SpeechSynthesizer>,
    /// `None` in dry-run mode.
    publisher: Option<FlashcardPublisher>,
    notes: NoteBuilder,
    speech_dir: PathBuf,
    state: RunState,
}

impl RunController {
    pub fn new(
        sentences: SentencePipeline,
        speech: Arc<dyn SpeechSynthesizer>,
        publisher: Option<FlashcardPublisher>,
        notes: NoteBuilder,
        speech_dir: PathBuf,
    ) -> Self {
        Self {
            sentences,
            speech,
            publisher,
            notes,
            speech_dir,
            state: RunState::default(),
        }
    }

    /// Wire the HTTP-backed services from `config`. With `dry_run` set the
    /// flashcard store is never contacted.
    pub fn from_config(config: &AppConfig, dry_run: bool) -> Self {
        let sentences = SentencePipeline::new(
            Arc::new(ApiGenerator::from_config(&config.llm)),
            PromptBuilder::new(&config.prompts, &config.language),
            TokenLimits::from(&config.llm),
        );
        let publisher = (!dry_run).then(|| {
            FlashcardPublisher::new(Arc::new(AnkiConnectClient::from_config(&config.anki)))
        });

        Self::new(
            sentences,
            Arc::new(ApiSynthesizer::from_config(&config.speech)),
            publisher,
            NoteBuilder::new(&config.anki),
            config.output.speech_dir.clone(),
        )
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    fn transition(&mut self, next: RunState) {
        log::debug!("run: {} -> {}", self.state.label(), next.label());
        self.state = next;
    }

    /// Run every step for `input`.
    ///
    /// Returns `Err` only when no sentence could be generated; in that case
    /// nothing is synthesized or published.
    pub async fn run(&mut self, input: TargetInput) -> Result<RunOutcome, PipelineError> {
        self.transition(RunState::Running(RunStep::Classifying));
        let kind = input.kind();
        log::info!(
            "target {:?} classified as {} ({})",
            input.text(),
            kind.as_str(),
            input.difficulty()
        );

        self.transition(RunState::Running(RunStep::Generating));
        let bundle = match self.sentences.generate(&input).await {
            Ok(bundle) => bundle,
            Err(e) => {
                self.transition(RunState::Failed);
                return Err(e);
            }
        };

        self.transition(RunState::Running(RunStep::Synthesizing));
        let target = audio_path(&self.speech_dir, &bundle.sentence);
        let audio = match self.speech.synthesize(&bundle.sentence, &target).await {
            Ok(artifact) => Some(artifact),
            Err(e) => {
                log::warn!("speech synthesis failed, no flashcard will be added: {e}");
                None
            }
        };

        let mut published = Vec::new();
        if let Some(artifact) = &audio {
            self.transition(RunState::Running(RunStep::Publishing));
            published = self.publish(&input, &bundle, artifact).await;
        }

        self.transition(RunState::Done);
        Ok(RunOutcome {
            kind,
            bundle,
            audio,
            published,
        })
    }

    async fn publish(
        &self,
        input: &TargetInput,
        bundle: &SentenceBundle,
        audio: &AudioArtifact,
    ) -> Vec<String> {
        let content = CardContent {
            target: input.text(),
            kind: input.kind(),
            difficulty: input.difficulty(),
            sentence: &bundle.sentence,
            definition: bundle.definition.as_deref(),
            translation: bundle.translation.as_deref(),
        };

        let mut notes = vec![self.notes.primary(&content, audio)];
        notes.extend(self.notes.bilingual(&content, audio));

        let Some(publisher) = &self.publisher else {
            for note in &notes {
                for (field, html) in &note.fields {
                    log::info!("dry run: {} [{field}] {html}", note.deck_name);
                }
            }
            return Vec::new();
        };

        let mut accepted = Vec::new();
        for note in &notes {
            if publisher.ensure_and_publish(note).await {
                accepted.push(note.deck_name.clone());
            }
        }
        accepted
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
