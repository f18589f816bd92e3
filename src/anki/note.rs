//! Flashcard note construction.
//!
//! A [`FlashcardNote`] is built in memory, sent once with `addNote`, and then
//! dropped; the store owns it from there on.
//!
//! Primary note layout:
//!
//! ```text
//! Front: highlighted sentence
//! Back:  highlighted sentence
//!        [target: definition]
//!        [click / press T to reveal → translation]
//!        reveal script
//!        + audio attachment
//! ```
//!
//! The optional bilingual companion swaps sides: native translation on the
//! front, target sentence plus audio on the back.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Serialize, Serializer};

use crate::config::AnkiConfig;
use crate::text::{highlight, Difficulty, InputKind};
use crate::tts::AudioArtifact;

/// Client-side script toggling the reveal region on click or the `T` key.
pub const REVEAL_SCRIPT: &str = include_str!("assets/reveal.html");

// ---------------------------------------------------------------------------
// Note types
// ---------------------------------------------------------------------------

/// A media file the store copies into its collection and references from
/// `fields`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioAttachment {
    pub path: PathBuf,
    pub filename: String,
    pub fields: Vec<String>,
}

/// One note as submitted to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashcardNote {
    pub deck_name: String,
    pub model_name: String,
    pub fields: BTreeMap<String, String>,
    pub tags: Vec<String>,
    pub audio: Vec<AudioAttachment>,
}

impl FlashcardNote {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NoteOptions {
    allow_duplicate: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NotePayload<'a> {
    deck_name: &'a str,
    model_name: &'a str,
    fields: &'a BTreeMap<String, String>,
    options: NoteOptions,
    tags: &'a [String],
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    audio: &'a [AudioAttachment],
}

/// Serialises in AnkiConnect's `addNote` shape. Duplicates are always
/// refused.
impl Serialize for FlashcardNote {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        NotePayload {
            deck_name: &self.deck_name,
            model_name: &self.model_name,
            fields: &self.fields,
            options: NoteOptions {
                allow_duplicate: false,
            },
            tags: &self.tags,
            audio: &self.audio,
        }
        .serialize(serializer)
    }
}

// ---------------------------------------------------------------------------
// CardContent
// ---------------------------------------------------------------------------

/// Everything generated for one card.
#[derive(Debug, Clone, Copy)]
pub struct CardContent<'a> {
    pub target: &'a str,
    pub kind: InputKind,
    pub difficulty: Difficulty,
    pub sentence: &'a str,
    pub definition: Option<&'a str>,
    pub translation: Option<&'a str>,
}

fn escape(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

/// The example sentence as HTML, with the target emphasised for words and
/// phrases.
pub fn sentence_html(content: &CardContent<'_>) -> String {
    if content.kind.wants_highlight() {
        highlight(content.sentence, content.target)
    } else {
        escape(content.sentence)
    }
}

/// The answer side of the primary note.
pub fn back_html(content: &CardContent<'_>) -> String {
    let mut html = format!(r#"<div class="vc-sentence">{}</div>"#, sentence_html(content));

    if let Some(definition) = content.definition.filter(|d| !d.trim().is_empty()) {
        html.push_str(&format!(
            r#"<div class="vc-definition"><b>{}</b>: {}</div>"#,
            escape(content.target),
            escape(definition)
        ));
    }

    if let Some(translation) = content.translation.filter(|t| !t.trim().is_empty()) {
        html.push_str(&format!(
            concat!(
                r#"<div class="vc-reveal" data-vc-reveal tabindex="0">"#,
                r#"<span class="vc-reveal-hint">Show translation (click or press T)</span>"#,
                r#"<span class="vc-reveal-text" hidden>{}</span>"#,
                "</div>"
            ),
            escape(translation)
        ));
        html.push_str(REVEAL_SCRIPT);
    }

    html
}

// ---------------------------------------------------------------------------
// NoteBuilder
// ---------------------------------------------------------------------------

/// Assembles notes using the deck, note type and field names from
/// [`AnkiConfig`].
#[derive(Debug, Clone)]
pub struct NoteBuilder {
    config: AnkiConfig,
}

impl NoteBuilder {
    pub fn new(config: &AnkiConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// The main card for the target text.
    pub fn primary(&self, content: &CardContent<'_>, audio: &AudioArtifact) -> FlashcardNote {
        self.note(
            &self.config.deck,
            sentence_html(content),
            back_html(content),
            content,
            audio,
        )
    }

    /// Native sentence → target sentence card, when a bilingual deck is
    /// configured and a translation exists.
    pub fn bilingual(
        &self,
        content: &CardContent<'_>,
        audio: &AudioArtifact,
    ) -> Option<FlashcardNote> {
        let deck = self.config.bilingual_deck.as_deref()?;
        let translation = content.translation.filter(|t| !t.trim().is_empty())?;

        Some(self.note(
            deck,
            format!(r#"<div class="vc-native">{}</div>"#, escape(translation)),
            format!(r#"<div class="vc-sentence">{}</div>"#, sentence_html(content)),
            content,
            audio,
        ))
    }

    fn note(
        &self,
        deck: &str,
        front: String,
        back: String,
        content: &CardContent<'_>,
        audio: &AudioArtifact,
    ) -> FlashcardNote {
        let fields = BTreeMap::from([
            (self.config.front_field.clone(), front),
            (self.config.back_field.clone(), back),
        ]);

        let mut tags = self.config.tags.clone();
        tags.push(content.kind.as_str().to_string());
        tags.push(content.difficulty.code().to_string());

        FlashcardNote {
            deck_name: deck.to_string(),
            model_name: self.config.model_name.clone(),
            fields,
            tags,
            audio: vec![AudioAttachment {
                path: absolute(audio.path()),
                filename: audio.file_name().to_string(),
                fields: vec![self.config.audio_field.clone()],
            }],
        }
    }
}

/// AnkiConnect resolves `path` in its own process, so relative paths are
/// anchored to the current directory first.
fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
