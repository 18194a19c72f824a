//! Heuristic parsing of free-form model output.
//!
//! These functions extract structure (final answers, rankings, tool calls,
//! verdicts, confidence scores) from LLM text. They are pure domain logic:
//! no I/O, just pattern matching. Each has a documented fallback so that an
//! ambiguous response never becomes an error.
//!
//! | Function | Use Case | Fallback |
//! |----------|----------|----------|
//! | [`split_final_answer`] | Internal monologue | whole text is reasoning and answer |
//! | [`parse_ranking`] | Document re-ranking | original order |
//! | [`first_valid_index`] | Votes / branch selection | `None` |
//! | [`count_citations`] | Citation metrics | 0 |
//! | [`extract_tool_call`] | Tool-calling verification | no tool call |
//! | [`judge_verdict`] | Red team judge | agrees with neither |
//! | [`parse_confidence`] | Confidence scoring | `None` |
//! | [`parse_numbered_items`] | Tree of thoughts | blank-line paragraphs |

use crate::flow::tool::ToolCall;
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Marker separating reasoning from the answer (case-sensitive)
pub const FINAL_ANSWER_MARKER: &str = "Final Answer:";

static INTEGER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

static CITATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[(\d+)\]").unwrap());

static CONFIDENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)confidence(?:\s+(?:score|level))?\s*[:=]\s*(\d{1,3}(?:\.\d+)?)\s*(%|/\s*100)?")
        .unwrap()
});

static CONFIDENCE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^\s*\**confidence(?:\s+(?:score|level))?\**\s*[:=].*$").unwrap()
});

static NUMBERED_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:\*\*)?(?:(?:approach|option|branch)\s+)?\d+\s*[.):]\s*(?:\*\*)?\s*(.*)$")
        .unwrap()
});

static NEGATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:\bnot|n't|\bnever|\bcannot)\s+(?:\w+\s+)?$").unwrap());

/// Reasoning and answer split out of an internal-monologue response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonologueSplit {
    pub reasoning: String,
    pub final_answer: String,
    pub marker_found: bool,
}

/// Split a response on the first [`FINAL_ANSWER_MARKER`].
///
/// Without a marker the whole (trimmed) text is both reasoning and answer.
///
/// ```
/// use flow_domain::flow::parsing::split_final_answer;
///
/// let split = split_final_answer("A\n\nB\n\nFinal Answer: C");
/// assert_eq!(split.reasoning, "A\n\nB");
/// assert_eq!(split.final_answer, "C");
/// ```
pub fn split_final_answer(text: &str) -> MonologueSplit {
    match text.find(FINAL_ANSWER_MARKER) {
        Some(pos) => MonologueSplit {
            reasoning: text[..pos].trim().to_string(),
            final_answer: text[pos + FINAL_ANSWER_MARKER.len()..].trim().to_string(),
            marker_found: true,
        },
        None => {
            let whole = text.trim().to_string();
            MonologueSplit {
                reasoning: whole.clone(),
                final_answer: whole,
                marker_found: false,
            }
        }
    }
}

/// Zero-based indices of every integer in `1..=count`, in order of first appearance.
fn valid_indices(text: &str, count: usize) -> Vec<usize> {
    let mut seen = HashSet::new();
    INTEGER
        .find_iter(text)
        .filter_map(|m| m.as_str().parse::<usize>().ok())
        .filter(|n| (1..=count).contains(n))
        .map(|n| n - 1)
        .filter(|idx| seen.insert(*idx))
        .collect()
}

/// Parse a 1-based ranking of `count` items out of free text.
///
/// Returns a complete zero-based permutation: the ranked indices first, then
/// any items the ranking omitted in their original order. Returns `None`
/// when no usable index was found (caller keeps the original order).
pub fn parse_ranking(text: &str, count: usize) -> Option<Vec<usize>> {
    let mut ranking = valid_indices(text, count);
    if ranking.is_empty() {
        return None;
    }
    for idx in 0..count {
        if !ranking.contains(&idx) {
            ranking.push(idx);
        }
    }
    Some(ranking)
}

/// First integer in `1..=count`, as a zero-based index
pub fn first_valid_index(text: &str, count: usize) -> Option<usize> {
    valid_indices(text, count).into_iter().next()
}

/// Number of distinct `[n]` citation markers in the text
pub fn count_citations(text: &str) -> usize {
    CITATION
        .captures_iter(text)
        .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
        .collect::<HashSet<_>>()
        .len()
}

/// Find the first embedded JSON object that names a known tool.
///
/// Accepts `{"tool": ..., "parameters": {...}}` as well as the
/// `name`/`arguments` spelling; string-encoded arguments are decoded.
pub fn extract_tool_call(text: &str, is_known_tool: impl Fn(&str) -> bool) -> Option<ToolCall> {
    for (start, _) in text.match_indices('{') {
        let mut stream = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Value>();
        let Some(Ok(Value::Object(object))) = stream.next() else {
            continue;
        };

        let Some(name) = object
            .get("tool")
            .or_else(|| object.get("name"))
            .and_then(Value::as_str)
        else {
            continue;
        };

        if !is_known_tool(name) {
            continue;
        }

        let parameters = match object.get("parameters").or_else(|| object.get("arguments")) {
            Some(Value::String(encoded)) => {
                serde_json::from_str(encoded).unwrap_or_else(|_| Value::String(encoded.clone()))
            }
            Some(value) => value.clone(),
            None => Value::Object(Default::default()),
        };

        return Some(ToolCall::new(name, parameters));
    }
    None
}

/// Which persona the Judge sided with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JudgeVerdict {
    pub agrees_with_architect: bool,
    pub agrees_with_skeptic: bool,
}

fn agreement_patterns(persona: &str) -> [Regex; 2] {
    [
        Regex::new(&format!(
            r"(?i)\b(?:agree|agrees|agreed|concur|concurs|side|sides|siding)\s+(?:\w+\s+)?with\s+the\s+{persona}\b"
        ))
        .unwrap(),
        Regex::new(&format!(
            r"(?i)\bthe\s+{persona}(?:'s)?\s+(?:\w+\s+){{0,3}}?(?:is|was|are)\s+(?:more\s+)?(?:correct|right|sound|stronger|persuasive|convincing)\b"
        ))
        .unwrap(),
    ]
}

static ARCHITECT_AGREEMENT: LazyLock<[Regex; 2]> =
    LazyLock::new(|| agreement_patterns("architect"));
static SKEPTIC_AGREEMENT: LazyLock<[Regex; 2]> = LazyLock::new(|| agreement_patterns("skeptic"));

/// Byte offset of the first non-negated agreement phrase
fn first_agreement(text: &str, patterns: &[Regex]) -> Option<usize> {
    patterns
        .iter()
        .flat_map(|re| re.find_iter(text))
        .filter(|m| !NEGATION.is_match(&text[..m.start()]))
        .map(|m| m.start())
        .min()
}

/// Scan the Judge's text for agreement with each persona.
///
/// The two flags are never both true: when both personas are endorsed, the
/// earliest endorsement wins.
pub fn judge_verdict(text: &str) -> JudgeVerdict {
    let architect = first_agreement(text, ARCHITECT_AGREEMENT.as_slice());
    let skeptic = first_agreement(text, SKEPTIC_AGREEMENT.as_slice());

    match (architect, skeptic) {
        (Some(a), Some(s)) => JudgeVerdict {
            agrees_with_architect: a <= s,
            agrees_with_skeptic: s < a,
        },
        (a, s) => JudgeVerdict {
            agrees_with_architect: a.is_some(),
            agrees_with_skeptic: s.is_some(),
        },
    }
}

/// Parse a self-reported `Confidence: NN` score, clamped to `[0, 100]`
pub fn parse_confidence(text: &str) -> Option<f64> {
    CONFIDENCE
        .captures_iter(text)
        .last()
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .map(|v| v.clamp(0.0, 100.0))
}

/// Remove `Confidence: ...` lines from an answer
pub fn strip_confidence_lines(text: &str) -> String {
    CONFIDENCE_LINE.replace_all(text, "").trim().to_string()
}

/// Split a list of numbered alternatives (`1.`, `2)`, `Approach 3:`).
///
/// Lines without a number continue the current item. Falls back to
/// blank-line separated paragraphs. At most `max` items are returned.
pub fn parse_numbered_items(text: &str, max: usize) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();
    for line in text.lines() {
        if let Some(caps) = NUMBERED_ITEM.captures(line) {
            items.push(caps.get(1).map_or("", |m| m.as_str()).trim().to_string());
        } else if let Some(current) = items.last_mut()
            && !line.trim().is_empty()
        {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(line.trim());
        }
    }
    items.retain(|item| !item.is_empty());

    if items.is_empty() {
        items = text
            .split("\n\n")
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
    }

    items.truncate(max);
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== split_final_answer Tests ====================

    #[test]
    fn test_split_final_answer_with_marker() {
        let split = split_final_answer("A\n\nB\n\nFinal Answer: C");
        assert_eq!(split.reasoning, "A\n\nB");
        assert_eq!(split.final_answer, "C");
        assert!(split.marker_found);
    }

    #[test]
    fn test_split_final_answer_uses_first_marker() {
        let split = split_final_answer("think Final Answer: X Final Answer: Y");
        assert_eq!(split.reasoning, "think");
        assert_eq!(split.final_answer, "X Final Answer: Y");
    }

    #[test]
    fn test_split_final_answer_is_case_sensitive() {
        let split = split_final_answer("reasoning\nfinal answer: lower");
        assert!(!split.marker_found);
        assert_eq!(split.reasoning, "reasoning\nfinal answer: lower");
        assert_eq!(split.final_answer, split.reasoning);
    }

    // ==================== parse_ranking Tests ====================

    #[test]
    fn test_parse_ranking_completes_permutation() {
        assert_eq!(parse_ranking("Ranking: 3, 1", 3), Some(vec![2, 0, 1]));
    }

    #[test]
    fn test_parse_ranking_ignores_out_of_range_and_duplicates() {
        assert_eq!(
            parse_ranking("2 > 2 > 7 > 1 (from 2019)", 3),
            Some(vec![1, 0, 2])
        );
    }

    #[test]
    fn test_parse_ranking_unparseable() {
        assert_eq!(parse_ranking("They are all equally good.", 4), None);
        assert_eq!(parse_ranking("9 and 12", 4), None);
    }

    #[test]
    fn test_first_valid_index() {
        assert_eq!(first_valid_index("I pick candidate 2.", 3), Some(1));
        assert_eq!(first_valid_index("none of them", 3), None);
    }

    // ==================== count_citations Tests ====================

    #[test]
    fn test_count_citations_distinct() {
        assert_eq!(count_citations("Per [1] and [2], and again [1]."), 2);
        assert_eq!(count_citations("No citations here [a]."), 0);
    }

    // ==================== extract_tool_call Tests ====================

    #[test]
    fn test_extract_tool_call_embedded() {
        let text = r#"I should verify this.
{"tool": "fact_check", "parameters": {"claim": "water boils at 100C"}}
Then I'll answer."#;
        let call = extract_tool_call(text, |name| name == "fact_check").unwrap();
        assert_eq!(call.tool, "fact_check");
        assert_eq!(call.parameters["claim"], "water boils at 100C");
    }

    #[test]
    fn test_extract_tool_call_name_arguments_string() {
        let text = r#"{"name": "calc", "arguments": "{\"expr\": \"2+2\"}"}"#;
        let call = extract_tool_call(text, |name| name == "calc").unwrap();
        assert_eq!(call.parameters["expr"], "2+2");
    }

    #[test]
    fn test_extract_tool_call_skips_unknown_and_takes_first() {
        let text = r#"{"tool": "unknown", "parameters": {}} {"tool": "a", "parameters": {"n": 1}} {"tool": "a", "parameters": {"n": 2}}"#;
        let call = extract_tool_call(text, |name| name == "a").unwrap();
        assert_eq!(call.parameters["n"], 1);
    }

    #[test]
    fn test_extract_tool_call_nested_wrapper() {
        let text = r#"{"call": {"tool": "a"}}"#;
        let call = extract_tool_call(text, |name| name == "a").unwrap();
        assert_eq!(call.parameters, serde_json::json!({}));
    }

    #[test]
    fn test_extract_tool_call_none() {
        assert!(extract_tool_call("Plain answer {not json}", |_| true).is_none());
    }

    // ==================== judge_verdict Tests ====================

    #[test]
    fn test_judge_agrees_with_architect() {
        let verdict = judge_verdict("After weighing both, I agree with the Architect.");
        assert!(verdict.agrees_with_architect);
        assert!(!verdict.agrees_with_skeptic);
    }

    #[test]
    fn test_judge_agrees_with_skeptic_via_correctness() {
        let verdict = judge_verdict("The Skeptic's critique is correct on cost.");
        assert!(!verdict.agrees_with_architect);
        assert!(verdict.agrees_with_skeptic);
    }

    #[test]
    fn test_judge_negated_agreement_ignored() {
        let verdict = judge_verdict("I do not agree with the architect.");
        assert!(!verdict.agrees_with_architect);
    }

    #[test]
    fn test_judge_disagree_is_not_agree() {
        let verdict = judge_verdict("I disagree with the skeptic entirely.");
        assert!(!verdict.agrees_with_skeptic);
    }

    #[test]
    fn test_judge_both_endorsed_earliest_wins() {
        let verdict =
            judge_verdict("I side with the skeptic on risk, though I agree with the architect on scope.");
        assert!(verdict.agrees_with_skeptic);
        assert!(!verdict.agrees_with_architect);
    }

    // ==================== confidence Tests ====================

    #[test]
    fn test_parse_confidence_formats() {
        assert_eq!(parse_confidence("Answer.\nConfidence: 85"), Some(85.0));
        assert_eq!(parse_confidence("confidence score = 72%"), Some(72.0));
        assert_eq!(parse_confidence("Confidence: 140/100"), Some(100.0));
        assert_eq!(parse_confidence("I am fairly sure."), None);
    }

    #[test]
    fn test_strip_confidence_lines() {
        assert_eq!(
            strip_confidence_lines("The answer is 4.\nConfidence: 90"),
            "The answer is 4."
        );
    }

    // ==================== numbered items Tests ====================

    #[test]
    fn test_parse_numbered_items() {
        let text = "Here are options:\n1. Economic angle\n   with detail\n2) Moral angle\nApproach 3: Legal angle";
        let items = parse_numbered_items(text, 5);
        assert_eq!(
            items,
            vec!["Economic angle with detail", "Moral angle", "Legal angle"]
        );
    }

    #[test]
    fn test_parse_numbered_items_paragraph_fallback() {
        let items = parse_numbered_items("First idea.\n\nSecond idea.\n\nThird.", 2);
        assert_eq!(items, vec!["First idea.", "Second idea."]);
    }
}
