//! Lexical classification of learner input into word / phrase / sentence.
//!
//! The rules are deliberately shallow:
//!
//! | Kind     | Rule                                                          |
//! |----------|---------------------------------------------------------------|
//! | Word     | letters, digits, `-` and `'` only, no whitespace              |
//! | Sentence | ends in `.`, `!` or `?` and has at least two word tokens      |
//! | Phrase   | anything else (including empty input)                         |

use std::sync::LazyLock;

use regex::Regex;

#[allow(clippy::expect_used)]
static SINGLE_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w\-']+$").expect("static regex"));

#[allow(clippy::expect_used)]
static WORD_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w\-']+").expect("static regex"));

/// What kind of text the learner asked for a card about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    Word,
    Phrase,
    Sentence,
}

impl InputKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputKind::Word => "word",
            InputKind::Phrase => "phrase",
            InputKind::Sentence => "sentence",
        }
    }

    /// Sentences are already complete, so they are not highlighted inside
    /// the generated example.
    pub fn wants_highlight(&self) -> bool {
        !matches!(self, InputKind::Sentence)
    }
}

/// `true` when `text` (trimmed) is a single word token.
pub fn is_single_word(text: &str) -> bool {
    SINGLE_WORD.is_match(text.trim())
}

/// Classify `text`. Total: every input maps to exactly one kind.
pub fn classify(text: &str) -> InputKind {
    let text = text.trim();

    if is_single_word(text) {
        return InputKind::Word;
    }

    let terminal = text.ends_with(['.', '!', '?']);
    if terminal && WORD_TOKEN.find_iter(text).nth(1).is_some() {
        return InputKind::Sentence;
    }

    InputKind::Phrase
}
