//! AnkiConnect client.
//!
//! Every call is a `POST` of `{ "action", "version", "params" }` to the
//! configured URL; every reply is `{ "result", "error" }` with exactly one of
//! the two set.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::anki::note::FlashcardNote;
use crate::config::AnkiConfig;

// ---------------------------------------------------------------------------
// AnkiError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum AnkiError {
    /// HTTP transport or connection error (Anki not running, …).
    #[error("AnkiConnect request failed: {0}")]
    Request(String),

    #[error("AnkiConnect request timed out")]
    Timeout,

    #[error("failed to parse AnkiConnect reply: {0}")]
    Parse(String),

    /// AnkiConnect answered with a non-null `error`.
    #[error("AnkiConnect {action} failed: {message}")]
    Action { action: String, message: String },

    /// Both `result` and `error` were null.
    #[error("AnkiConnect {0} returned no result")]
    EmptyResult(String),
}

impl AnkiError {
    /// `true` when the store refused a note because it already exists.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, AnkiError::Action { message, .. } if message.contains("duplicate"))
    }
}

impl From<reqwest::Error> for AnkiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AnkiError::Timeout
        } else {
            AnkiError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// CardStore trait
// ---------------------------------------------------------------------------

/// The three flashcard-store actions the publisher needs.
#[async_trait]
pub trait CardStore: Send + Sync {
    async fn deck_names(&self) -> Result<Vec<String>, AnkiError>;

    /// Create `name`, returning its deck id.
    async fn create_deck(&self, name: &str) -> Result<i64, AnkiError>;

    /// Add `note`, returning its note id.
    async fn add_note(&self, note: &FlashcardNote) -> Result<i64, AnkiError>;
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct Envelope<'a, P> {
    action: &'a str,
    version: u8,
    params: P,
}

#[derive(Debug, Deserialize)]
struct Reply<T> {
    result: Option<T>,
    error: Option<String>,
}

// ---------------------------------------------------------------------------
// AnkiConnectClient
// ---------------------------------------------------------------------------

pub struct AnkiConnectClient {
    client: reqwest::Client,
    url: String,
    version: u8,
}

impl AnkiConnectClient {
    pub fn from_config(config: &AnkiConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            url: config.url.clone(),
            version: config.version,
        }
    }

    /// Send one action and unwrap its `result`.
    pub async fn invoke<P, T>(&self, action: &str, params: P) -> Result<T, AnkiError>
    where
        P: Serialize + Send,
        T: DeserializeOwned,
    {
        let envelope = Envelope {
            action,
            version: self.version,
            params,
        };

        let response = self.client.post(&self.url).json(&envelope).send().await?;

        let reply: Reply<T> = response
            .json()
            .await
            .map_err(|e| AnkiError::Parse(e.to_string()))?;

        if let Some(message) = reply.error {
            return Err(AnkiError::Action {
                action: action.to_string(),
                message,
            });
        }
        reply
            .result
            .ok_or_else(|| AnkiError::EmptyResult(action.to_string()))
    }
}

#[async_trait]
impl CardStore for AnkiConnectClient {
    async fn deck_names(&self) -> Result<Vec<String>, AnkiError> {
        self.invoke("deckNames", serde_json::json!({})).await
    }

    async fn create_deck(&self, name: &str) -> Result<i64, AnkiError> {
        self.invoke("createDeck", serde_json::json!({ "deck": name }))
            .await
    }

    async fn add_note(&self, note: &FlashcardNote) -> Result<i64, AnkiError> {
        self.invoke("addNote", serde_json::json!({ "note": note }))
            .await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
