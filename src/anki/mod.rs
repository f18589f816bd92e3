//! Flashcard store integration (AnkiConnect).
//!
//! This module provides:
//! * [`CardStore`]: the `deckNames` / `createDeck` / `addNote` actions.
//! * [`AnkiConnectClient`]: JSON envelope client for a local AnkiConnect.
//! * [`NoteBuilder`] / [`FlashcardNote`]: primary and bilingual notes.
//! * [`FlashcardPublisher`]: best-effort deck bootstrap and submission.

pub mod client;
pub mod note;
pub mod publisher;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use client::{AnkiConnectClient, AnkiError, CardStore};
pub use note::{AudioAttachment, CardContent, FlashcardNote, NoteBuilder, REVEAL_SCRIPT};
pub use publisher::FlashcardPublisher;
