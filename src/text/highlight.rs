//! Emphasis markup for the target text inside a generated sentence.

use regex::{Regex, RegexBuilder};

use super::classify::is_single_word;

/// Render `sentence` as HTML with every case-insensitive occurrence of
/// `target` wrapped in `<b>…</b>`.
///
/// Matching runs on the raw text; the text between and inside matches is
/// escaped afterwards, so markup-looking input never produces broken HTML.
/// Single words only match on word boundaries, so `chat` does not light up
/// inside `chaton`. Anything else matches as a literal substring.
pub fn highlight(sentence: &str, target: &str) -> String {
    let target = target.trim();
    if target.is_empty() {
        return html_escape::encode_text(sentence).into_owned();
    }

    let re = match target_pattern(target) {
        Ok(re) => re,
        Err(e) => {
            log::warn!("highlight: could not build pattern for {target:?}: {e}");
            return html_escape::encode_text(sentence).into_owned();
        }
    };

    let mut html = String::with_capacity(sentence.len() + 8);
    let mut last = 0;
    for m in re.find_iter(sentence) {
        html_escape::encode_text_to_string(&sentence[last..m.start()], &mut html);
        html.push_str("<b>");
        html_escape::encode_text_to_string(m.as_str(), &mut html);
        html.push_str("</b>");
        last = m.end();
    }
    html_escape::encode_text_to_string(&sentence[last..], &mut html);
    html
}

fn target_pattern(target: &str) -> Result<Regex, regex::Error> {
    let escaped = regex::escape(target);
    let pattern = if is_single_word(target) {
        format!(r"\b{escaped}\b")
    } else {
        escaped
    };
    RegexBuilder::new(&pattern).case_insensitive(true).build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_whole_word() {
        assert_eq!(
            highlight("Je vois le chat", "chat"),
            "Je vois le <b>chat</b>"
        );
    }

    #[test]
    fn does_not_match_inside_longer_word() {
        assert_eq!(highlight("Le chaton joue", "chat"), "Le chaton joue");
    }

    #[test]
    fn no_match_returns_sentence_unchanged() {
        assert_eq!(highlight("Le chien court", "chat"), "Le chien court");
    }

    #[test]
    fn is_case_insensitive_and_keeps_original_casing() {
        assert_eq!(
            highlight("Chat noir, chat blanc", "chat"),
            "<b>Chat</b> noir, <b>chat</b> blanc"
        );
    }

    #[test]
    fn phrase_matches_as_substring() {
        assert_eq!(
            highlight("Il a le cafard depuis lundi", "le cafard"),
            "Il a <b>le cafard</b> depuis lundi"
        );
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        assert_eq!(
            highlight("Vraiment (peut-être) ?", "(peut-être)"),
            "Vraiment <b>(peut-être)</b> ?"
        );
        assert_eq!(highlight("a.b acb", "a.b c"), "a.b acb");
    }

    #[test]
    fn accented_words_respect_boundaries() {
        assert_eq!(
            highlight("Il fait été comme étéà", "été"),
            "Il fait <b>été</b> comme étéà"
        );
    }

    #[test]
    fn empty_target_is_a_no_op() {
        assert_eq!(highlight("Bonjour", "  "), "Bonjour");
    }

    #[test]
    fn target_never_matches_inside_an_entity() {
        assert_eq!(
            highlight("Tom & Jerry amp", "amp"),
            "Tom &amp; Jerry <b>amp</b>"
        );
        assert_eq!(highlight("a < b", "lt"), "a &lt; b");
    }

    #[test]
    fn markup_in_sentence_and_match_is_escaped() {
        assert_eq!(
            highlight("<i>chat</i> & chien", "chat"),
            "&lt;i&gt;<b>chat</b>&lt;/i&gt; &amp; chien"
        );
        assert_eq!(
            highlight("Tom & Jerry jouent", "Tom & Jerry"),
            "<b>Tom &amp; Jerry</b> jouent"
        );
    }
}
