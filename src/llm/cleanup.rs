//! Post-processing of raw model replies.
//!
//! Models are told to reply with only the sentence or translation, but they
//! still add a closing period, wrap the answer in quotes, or restate the
//! question ("The phrase "Hi" translates to "Salut""). These helpers undo the
//! common cases on a best-effort basis.

use std::sync::LazyLock;

use regex::Regex;

/// Opening and closing quote characters recognised around a reply.
const QUOTES: &[char] = &['"', '\'', '“', '”', '«', '»', '„'];

#[allow(clippy::expect_used)]
static QUOTED_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"["“«„]\s*([^"”»“]+?)\s*["”»“]"#).expect("static regex"));

/// Trim `reply` and drop exactly one trailing `.` if present.
pub fn strip_trailing_period(reply: &str) -> String {
    let trimmed = reply.trim();
    trimmed.strip_suffix('.').unwrap_or(trimmed).to_string()
}

/// Extract the bare translation from a reply.
///
/// * If the reply says "translates to" and holds several quoted segments,
///   the last one is the translation.
/// * Quotes wrapping the whole reply are removed.
///
/// The result never ends in a single trailing `.`, even when the period sat
/// inside the quotes.
pub fn clean_translation(reply: &str) -> String {
    let reply = reply.trim();

    if reply.to_lowercase().contains("translates to") {
        let segments: Vec<&str> = QUOTED_SEGMENT
            .captures_iter(reply)
            .filter_map(|c| c.get(1).map(|m| m.as_str()))
            .collect();
        if segments.len() > 1 {
            if let Some(last) = segments.last() {
                return strip_trailing_period(last);
            }
        }
    }

    strip_trailing_period(strip_wrapping_quotes(reply))
}

fn strip_wrapping_quotes(text: &str) -> &str {
    let mut chars = text.chars();
    match (chars.next(), chars.next_back()) {
        (Some(first), Some(last)) if QUOTES.contains(&first) && QUOTES.contains(&last) => {
            text[first.len_utf8()..text.len() - last.len_utf8()].trim()
        }
        _ => text,
    }
}
