//! Deterministic post-processing rules applied to a model answer.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static MARKDOWN_EMPHASIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\*\*|__|\*|`)").unwrap());
static MARKDOWN_HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^#{1,6}\s+").unwrap());
static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]{2,}").unwrap());
static BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Rule set applied in a fixed order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostProcessingRules {
    pub strip_markdown: bool,
    pub forbidden_phrases: Vec<String>,
    pub max_length: Option<usize>,
    pub required_disclaimer: Option<String>,
}

/// Output of [`PostProcessingRules::apply`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostProcessed {
    pub text: String,
    pub rules_applied: Vec<&'static str>,
}

impl PostProcessingRules {
    /// Apply markdown stripping, phrase removal, whitespace normalization,
    /// truncation and disclaimer, in that order. Only rules that changed the
    /// text are reported.
    pub fn apply(&self, input: &str) -> PostProcessed {
        let mut text = input.to_string();
        let mut rules_applied = Vec::new();

        if self.strip_markdown {
            let stripped = MARKDOWN_EMPHASIS
                .replace_all(&MARKDOWN_HEADING.replace_all(&text, ""), "")
                .into_owned();
            if stripped != text {
                text = stripped;
                rules_applied.push("strip_markdown");
            }
        }

        let mut removed_phrase = false;
        for phrase in self.forbidden_phrases.iter().filter(|p| !p.trim().is_empty()) {
            let pattern = Regex::new(&format!("(?i){}", regex::escape(phrase)));
            if let Ok(pattern) = pattern
                && pattern.is_match(&text)
            {
                text = pattern.replace_all(&text, "").into_owned();
                removed_phrase = true;
            }
        }
        if removed_phrase {
            rules_applied.push("forbidden_phrases");
        }

        let normalized = BLANK_LINES
            .replace_all(&WHITESPACE_RUN.replace_all(&text, " "), "\n\n")
            .trim()
            .to_string();
        if normalized != text {
            text = normalized;
            rules_applied.push("normalize_whitespace");
        }

        if let Some(max) = self.max_length
            && text.chars().count() > max
        {
            let keep = max.saturating_sub(3);
            let mut truncated: String = text.chars().take(keep).collect();
            truncated = truncated.trim_end().to_string();
            truncated.push_str("...");
            text = truncated;
            rules_applied.push("max_length");
        }

        if let Some(disclaimer) = self.required_disclaimer.as_deref()
            && !disclaimer.trim().is_empty()
            && !text.contains(disclaimer)
        {
            text = format!("{}\n\n{}", text, disclaimer);
            rules_applied.push("required_disclaimer");
        }

        PostProcessed {
            text,
            rules_applied,
        }
    }
}
