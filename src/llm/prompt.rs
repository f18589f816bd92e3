//! Prompt templating for sentence, definition and translation requests.
//!
//! Templates come from [`PromptTemplates`] and use `<name>` placeholders.
//! [`fill`] is the raw substitution primitive; [`PromptBuilder`] layers the
//! per-purpose checks on top so a prompt is never sent with a placeholder left
//! in it.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use thiserror::Error;

use crate::config::{LanguageConfig, PromptTemplates};
use crate::text::{Difficulty, InputKind, TargetInput};

#[allow(clippy::expect_used)]
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([a-z_]+)>").expect("static regex"));

// ---------------------------------------------------------------------------
// Placeholder names
// ---------------------------------------------------------------------------

pub const TARGET: &str = "target";
pub const DIFFICULTY: &str = "difficulty";
pub const LEVEL: &str = "level";
pub const TARGET_LANGUAGE: &str = "target_language";
pub const NATIVE_LANGUAGE: &str = "native_language";
pub const SENTENCE: &str = "sentence";

// ---------------------------------------------------------------------------
// PromptError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum PromptError {
    /// No (or a blank) template is configured for the purpose.
    #[error("no prompt template configured for {0}")]
    MissingTemplate(&'static str),

    /// The template names a placeholder that is never substituted for its
    /// purpose.
    #[error("{purpose} template references unknown placeholder <{placeholder}>")]
    UnresolvedPlaceholder {
        purpose: &'static str,
        placeholder: String,
    },
}

// ---------------------------------------------------------------------------
// PromptPurpose
// ---------------------------------------------------------------------------

/// What a prompt is asking the generation service for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptPurpose {
    /// Example sentence for a single word, one template per tier.
    WordSentence(Difficulty),
    /// Example sentence for a phrase or sentence.
    PhraseSentence,
    Definition,
    Translation,
}

impl PromptPurpose {
    /// Every purpose, in the order templates are validated.
    pub fn all() -> [PromptPurpose; 6] {
        [
            PromptPurpose::WordSentence(Difficulty::A2),
            PromptPurpose::WordSentence(Difficulty::B1),
            PromptPurpose::WordSentence(Difficulty::B2),
            PromptPurpose::PhraseSentence,
            PromptPurpose::Definition,
            PromptPurpose::Translation,
        ]
    }

    /// The sentence purpose for a classified input.
    pub fn sentence_for(input: &TargetInput) -> Self {
        match input.kind() {
            InputKind::Word => PromptPurpose::WordSentence(input.difficulty()),
            InputKind::Phrase | InputKind::Sentence => PromptPurpose::PhraseSentence,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PromptPurpose::WordSentence(Difficulty::A2) => "word sentence (a2)",
            PromptPurpose::WordSentence(Difficulty::B1) => "word sentence (b1)",
            PromptPurpose::WordSentence(Difficulty::B2) => "word sentence (b2)",
            PromptPurpose::PhraseSentence => "phrase sentence",
            PromptPurpose::Definition => "definition",
            PromptPurpose::Translation => "translation",
        }
    }

    /// Placeholders that get a value for this purpose.
    pub fn allowed_placeholders(&self) -> &'static [&'static str] {
        match self {
            PromptPurpose::WordSentence(_) | PromptPurpose::PhraseSentence => {
                &[TARGET, DIFFICULTY, LEVEL, TARGET_LANGUAGE, NATIVE_LANGUAGE]
            }
            PromptPurpose::Definition => &[TARGET, TARGET_LANGUAGE, NATIVE_LANGUAGE],
            PromptPurpose::Translation => &[SENTENCE, TARGET_LANGUAGE, NATIVE_LANGUAGE],
        }
    }
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Replace every `<name>` in `template` whose name is a key of
/// `substitutions`.
///
/// Substitution is single-pass, so values containing `<…>` are never
/// re-expanded. Placeholders without a value are left verbatim; use
/// [`check_template`] or [`PromptBuilder::build`] to reject them.
pub fn fill(template: &str, substitutions: &HashMap<&str, &str>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            substitutions
                .get(&caps[1])
                .map_or_else(|| caps[0].to_string(), |v| (*v).to_string())
        })
        .into_owned()
}

/// Names of all `<name>` placeholders in `template`, in order of appearance.
pub fn placeholders(template: &str) -> Vec<&str> {
    PLACEHOLDER
        .captures_iter(template)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect()
}

/// Fail if `template` is blank or names a placeholder `purpose` never fills.
pub fn check_template(purpose: PromptPurpose, template: &str) -> Result<(), PromptError> {
    if template.trim().is_empty() {
        return Err(PromptError::MissingTemplate(purpose.name()));
    }

    let allowed = purpose.allowed_placeholders();
    match placeholders(template)
        .into_iter()
        .find(|name| !allowed.contains(name))
    {
        Some(unknown) => Err(PromptError::UnresolvedPlaceholder {
            purpose: purpose.name(),
            placeholder: unknown.to_string(),
        }),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// PromptBuilder
// ---------------------------------------------------------------------------

/// Produces concrete prompts from the configured templates.
///
/// # Example
/// ```rust
/// use vocab_cards::config::AppConfig;
/// use vocab_cards::llm::PromptBuilder;
/// use vocab_cards::text::{Difficulty, TargetInput};
///
/// let config = AppConfig::default();
/// let builder = PromptBuilder::new(&config.prompts, &config.language);
/// let prompt = builder
///     .sentence_prompt(&TargetInput::new("chat", Difficulty::A2))
///     .unwrap();
/// assert!(prompt.contains("\"chat\""));
/// assert!(prompt.contains("beginner"));
/// ```
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    templates: PromptTemplates,
    language: LanguageConfig,
}

impl PromptBuilder {
    pub fn new(templates: &PromptTemplates, language: &LanguageConfig) -> Self {
        Self {
            templates: templates.clone(),
            language: language.clone(),
        }
    }

    /// Build the prompt for `purpose`.
    ///
    /// The language placeholders are always supplied; `substitutions` adds
    /// the purpose-specific ones.
    pub fn build(
        &self,
        purpose: PromptPurpose,
        substitutions: &HashMap<&str, &str>,
    ) -> Result<String, PromptError> {
        let template = self.templates.for_purpose(purpose);
        check_template(purpose, template)?;

        let mut values: HashMap<&str, &str> = HashMap::from([
            (TARGET_LANGUAGE, self.language.target_language.as_str()),
            (NATIVE_LANGUAGE, self.language.native_language.as_str()),
        ]);
        values.extend(substitutions.iter().map(|(k, v)| (*k, *v)));

        if let Some(missing) = placeholders(template)
            .into_iter()
            .find(|name| !values.contains_key(name))
        {
            return Err(PromptError::UnresolvedPlaceholder {
                purpose: purpose.name(),
                placeholder: missing.to_string(),
            });
        }

        Ok(fill(template, &values))
    }

    /// Example-sentence prompt: the word template for the input's tier, or
    /// the phrase template for phrases and sentences.
    pub fn sentence_prompt(&self, input: &TargetInput) -> Result<String, PromptError> {
        let difficulty = input.difficulty();
        let purpose = PromptPurpose::sentence_for(input);
        let level = match purpose {
            PromptPurpose::WordSentence(_) => difficulty.tier(),
            _ => difficulty.label(),
        };

        self.build(
            purpose,
            &HashMap::from([
                (TARGET, input.text()),
                (DIFFICULTY, difficulty.code()),
                (LEVEL, level),
            ]),
        )
    }

    pub fn definition_prompt(&self, target: &str) -> Result<String, PromptError> {
        self.build(PromptPurpose::Definition, &HashMap::from([(TARGET, target)]))
    }

    pub fn translation_prompt(&self, sentence: &str) -> Result<String, PromptError> {
        self.build(
            PromptPurpose::Translation,
            &HashMap::from([(SENTENCE, sentence)]),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn builder_with(templates: PromptTemplates) -> PromptBuilder {
        PromptBuilder::new(&templates, &LanguageConfig::default())
    }

    // -----------------------------------------------------------------------
    // fill
    // -----------------------------------------------------------------------

    #[test]
    fn fill_replaces_every_occurrence() {
        let subs = HashMap::from([("x", "Y")]);
        assert_eq!(fill("<x> and <x>", &subs), "Y and Y");
    }

    #[test]
    fn fill_does_not_reexpand_values() {
        let subs = HashMap::from([("a", "<b>"), ("b", "B")]);
        assert_eq!(fill("<a> <b>", &subs), "<b> B");
    }

    /// `fill` alone lets unknown placeholders through; the builder is what
    /// refuses them (see `build_rejects_unresolved_placeholder`).
    #[test]
    fn fill_leaves_unknown_placeholders_verbatim() {
        let subs = HashMap::from([("x", "Y")]);
        assert_eq!(fill("<x> <unknown>", &subs), "Y <unknown>");
    }

    #[test]
    fn placeholders_lists_names_in_order() {
        assert_eq!(
            placeholders("<target> in <target_language>, <target>"),
            vec!["target", "target_language", "target"]
        );
    }

    // -----------------------------------------------------------------------
    // check_template
    // -----------------------------------------------------------------------

    #[test]
    fn blank_template_is_missing() {
        assert!(matches!(
            check_template(PromptPurpose::Definition, " \n"),
            Err(PromptError::MissingTemplate("definition"))
        ));
    }

    #[test]
    fn sentence_placeholder_is_not_allowed_in_definition() {
        let err = check_template(PromptPurpose::Definition, "Define <sentence>").unwrap_err();
        assert!(matches!(
            err,
            PromptError::UnresolvedPlaceholder { ref placeholder, .. } if placeholder == "sentence"
        ));
    }

    #[test]
    fn default_templates_are_all_valid() {
        let templates = PromptTemplates::default();
        for purpose in PromptPurpose::all() {
            assert!(
                check_template(purpose, templates.for_purpose(purpose)).is_ok(),
                "default template for {} must be valid",
                purpose.name()
            );
        }
    }

    // -----------------------------------------------------------------------
    // PromptBuilder
    // -----------------------------------------------------------------------

    #[test]
    fn word_prompt_uses_tier_template() {
        let templates = PromptTemplates {
            word_sentence_a2: "A2 <level> <target> <difficulty>".into(),
            word_sentence_b2: "B2 <level> <target>".into(),
            ..PromptTemplates::default()
        };
        let builder = builder_with(templates);

        let a2 = builder
            .sentence_prompt(&TargetInput::new("chat", Difficulty::A2))
            .unwrap();
        assert_eq!(a2, "A2 beginner chat a2");

        let b2 = builder
            .sentence_prompt(&TargetInput::new("chat", Difficulty::B2))
            .unwrap();
        assert_eq!(b2, "B2 advanced chat");
    }

    #[test]
    fn phrase_and_sentence_prompts_use_phrase_template_with_label() {
        let templates = PromptTemplates {
            phrase_sentence: "[<level>] <target> in <target_language>".into(),
            ..PromptTemplates::default()
        };
        let builder = builder_with(templates);

        let phrase = builder
            .sentence_prompt(&TargetInput::new("bon après-midi", Difficulty::B1))
            .unwrap();
        assert_eq!(phrase, "[B1 (intermediate)] bon après-midi in French");

        let sentence = builder
            .sentence_prompt(&TargetInput::new("Le chat dort.", Difficulty::A2))
            .unwrap();
        assert_eq!(sentence, "[A2 (elementary)] Le chat dort. in French");
    }

    #[test]
    fn definition_prompt_substitutes_languages() {
        let templates = PromptTemplates {
            definition: "<target>: <target_language> -> <native_language>".into(),
            ..PromptTemplates::default()
        };
        let prompt = builder_with(templates).definition_prompt("chat").unwrap();
        assert_eq!(prompt, "chat: French -> English");
    }

    #[test]
    fn translation_prompt_embeds_sentence() {
        let prompt = builder_with(PromptTemplates::default())
            .translation_prompt("Le chat dort")
            .unwrap();
        assert!(prompt.contains("Le chat dort"));
        assert!(prompt.contains("English"));
        assert!(!prompt.contains('<'));
    }

    #[test]
    fn build_rejects_unresolved_placeholder() {
        let templates = PromptTemplates {
            translation: "Translate <sentence> for <audience>".into(),
            ..PromptTemplates::default()
        };
        let err = builder_with(templates)
            .translation_prompt("Bonjour")
            .unwrap_err();
        assert!(err.to_string().contains("<audience>"));
    }

    #[test]
    fn build_rejects_missing_template() {
        let templates = PromptTemplates {
            phrase_sentence: String::new(),
            ..PromptTemplates::default()
        };
        let err = builder_with(templates)
            .sentence_prompt(&TargetInput::new("bon appétit", Difficulty::A2))
            .unwrap_err();
        assert!(matches!(err, PromptError::MissingTemplate("phrase sentence")));
    }
}
