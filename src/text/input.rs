//! The learner's request: target text plus difficulty tier.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::classify::{classify, InputKind};

// ---------------------------------------------------------------------------
// Difficulty
// ---------------------------------------------------------------------------

/// Coarse CEFR proficiency tier controlling prompt complexity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Difficulty {
    A2,
    B1,
    B2,
}

impl Difficulty {
    /// Lower-case code as typed on the command line.
    pub fn code(&self) -> &'static str {
        match self {
            Difficulty::A2 => "a2",
            Difficulty::B1 => "b1",
            Difficulty::B2 => "b2",
        }
    }

    /// Learner tier substituted into word-sentence templates.
    pub fn tier(&self) -> &'static str {
        match self {
            Difficulty::A2 => "beginner",
            Difficulty::B1 => "intermediate",
            Difficulty::B2 => "advanced",
        }
    }

    /// Human-readable label substituted into phrase-sentence templates.
    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::A2 => "A2 (elementary)",
            Difficulty::B1 => "B1 (intermediate)",
            Difficulty::B2 => "B2 (upper intermediate)",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown difficulty '{0}' (expected a2, b1 or b2)")]
pub struct DifficultyParseError(pub String);

impl FromStr for Difficulty {
    type Err = DifficultyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a2" => Ok(Difficulty::A2),
            "b1" => Ok(Difficulty::B1),
            "b2" => Ok(Difficulty::B2),
            _ => Err(DifficultyParseError(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// TargetInput
// ---------------------------------------------------------------------------

/// Immutable, classified learner input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetInput {
    text: String,
    kind: InputKind,
    difficulty: Difficulty,
}

impl TargetInput {
    /// Trim `text` and classify it.
    pub fn new(text: &str, difficulty: Difficulty) -> Self {
        let text = text.trim().to_string();
        let kind = classify(&text);
        Self {
            text,
            kind,
            difficulty,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> InputKind {
        self.kind
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }
}
