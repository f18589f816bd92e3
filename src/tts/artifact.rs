//! Synthesized audio on disk.
//!
//! File names are derived from the spoken sentence so the same sentence
//! always lands at the same path:
//!
//! ```text
//! "Bonjour, le monde!"  →  speech_files/Bonjour-le-monde.mp3
//! ```

use std::path::{Path, PathBuf};

/// Extension of every audio artifact; both providers are asked for MP3.
pub const AUDIO_EXTENSION: &str = "mp3";

/// Longest file stem kept, in bytes. Leaves room for the extension under the
/// usual 255-byte file-name limit.
const MAX_STEM_BYTES: usize = 200;

/// Stem used when the sentence has no alphanumeric content at all.
const FALLBACK_STEM: &str = "speech";

/// Derive the audio file name for `sentence`.
///
/// Whitespace runs become a single hyphen, everything that is neither
/// alphanumeric nor a hyphen is dropped, and `.mp3` is appended.
pub fn audio_file_name(sentence: &str) -> String {
    let joined = sentence.split_whitespace().collect::<Vec<_>>().join("-");

    let mut stem = String::with_capacity(joined.len());
    for c in joined.chars() {
        if c.is_alphanumeric() {
            stem.push(c);
        } else if c == '-' && !stem.is_empty() && !stem.ends_with('-') {
            stem.push('-');
        }
    }

    let mut end = stem.len().min(MAX_STEM_BYTES);
    while !stem.is_char_boundary(end) {
        end -= 1;
    }
    let stem = stem[..end].trim_end_matches('-');
    let stem = if stem.is_empty() { FALLBACK_STEM } else { stem };

    format!("{stem}.{AUDIO_EXTENSION}")
}

/// Full path of the audio file for `sentence` inside `dir`.
pub fn audio_path(dir: &Path, sentence: &str) -> PathBuf {
    dir.join(audio_file_name(sentence))
}

// ---------------------------------------------------------------------------
// AudioArtifact
// ---------------------------------------------------------------------------

/// An audio file written exactly once by the synthesizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioArtifact {
    path: PathBuf,
    size_bytes: usize,
}

impl AudioArtifact {
    /// Write `bytes` to `path`, creating the parent directory if needed.
    pub async fn write(path: &Path, bytes: &[u8]) -> std::io::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, bytes).await?;

        Ok(Self {
            path: path.to_path_buf(),
            size_bytes: bytes.len(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name component, as attached to the flashcard.
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }

    pub fn size_bytes(&self) -> usize {
        self.size_bytes
    }
}
