//! Flashcard publisher: deck bootstrap plus single-shot note submission.
//!
//! Neither operation propagates errors: failures are logged and reported as
//! `false` so the run can finish on a best-effort basis. Nothing is retried.

use std::sync::Arc;

use crate::anki::client::CardStore;
use crate::anki::note::FlashcardNote;

pub struct FlashcardPublisher {
    store: Arc<dyn CardStore>,
}

impl FlashcardPublisher {
    pub fn new(store: Arc<dyn CardStore>) -> Self {
        Self { store }
    }

    /// Create `name` if the store does not list it yet.
    ///
    /// Returns `true` when the deck is known to exist afterwards. A `false`
    /// is not fatal: the store rejects notes for a missing deck on its own.
    pub async fn ensure_deck(&self, name: &str) -> bool {
        match self.store.deck_names().await {
            Ok(names) if names.iter().any(|n| n == name) => {
                log::debug!("anki: deck {name:?} exists");
                true
            }
            Ok(_) => match self.store.create_deck(name).await {
                Ok(id) => {
                    log::info!("anki: created deck {name:?} (id {id})");
                    true
                }
                Err(e) => {
                    log::warn!("anki: could not create deck {name:?}: {e}");
                    false
                }
            },
            Err(e) => {
                log::warn!("anki: could not list decks: {e}");
                false
            }
        }
    }

    /// Submit `note` once. Returns whether the store accepted it.
    pub async fn publish(&self, note: &FlashcardNote) -> bool {
        match self.store.add_note(note).await {
            Ok(id) => {
                log::info!("anki: added note {id} to {:?}", note.deck_name);
                true
            }
            Err(e) if e.is_duplicate() => {
                log::warn!("anki: {:?} already has this note", note.deck_name);
                false
            }
            Err(e) => {
                log::error!("anki: failed to add note to {:?}: {e}", note.deck_name);
                false
            }
        }
    }

    /// [`ensure_deck`](Self::ensure_deck) followed by
    /// [`publish`](Self::publish).
    pub async fn ensure_and_publish(&self, note: &FlashcardNote) -> bool {
        self.ensure_deck(&note.deck_name).await;
        self.publish(note).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
