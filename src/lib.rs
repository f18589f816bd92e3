//! Generate a language-learning flashcard from a word, phrase or sentence.
//!
//! A run classifies the input, asks an LLM for an example sentence with a
//! definition and translation, synthesizes the sentence as speech and adds a
//! note to a local Anki collection through AnkiConnect.

pub mod anki;
pub mod config;
pub mod llm;
pub mod pipeline;
pub mod text;
pub mod tts;
