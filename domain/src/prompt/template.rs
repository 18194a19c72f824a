//! Prompt templates for each agentic flow

use crate::flow::document::Document;

/// Characters of each document shown to the re-ranker
const RERANK_EXCERPT_CHARS: usize = 500;

/// Templates for generating prompts at each flow step
pub struct FlowPromptTemplate;

impl FlowPromptTemplate {
    // ==================== Internal Monologue ====================

    /// Default instruction appended to the prompt
    pub fn internal_monologue_prefix() -> &'static str {
        r#"Take a deep breath and think step by step. Work through the problem in detail,
considering the relevant evidence and counterarguments, before committing to an answer.
When you are done reasoning, write your answer on a new line starting with "Final Answer:"."#
    }

    // ==================== RAG with Re-ranking ====================

    pub fn rerank_prompt(query: &str, documents: &[Document], criteria: &str) -> String {
        let mut prompt = format!(
            r#"Rank the following documents by {} for this question:

{}

Documents:
"#,
            criteria, query
        );
        for (i, doc) in documents.iter().enumerate() {
            prompt.push_str(&format!(
                "\n[{}] {}\n{}\n",
                i + 1,
                doc.title,
                doc.excerpt(RERANK_EXCERPT_CHARS)
            ));
        }
        prompt.push_str(
            r#"
Reply with the document numbers from most to least relevant, separated by commas (e.g. "3, 1, 2")."#,
        );
        prompt
    }

    pub fn rag_answer_prompt(query: &str, documents: &[Document]) -> String {
        let mut prompt = String::from(
            "Answer the question using the documents below. Cite the documents you rely on with \
             their bracket markers, e.g. [1] or [2].\n\nDocuments:\n",
        );
        for (i, doc) in documents.iter().enumerate() {
            prompt.push_str(&format!(
                "\n[{}] {} ({})\n{}\n",
                i + 1,
                doc.title,
                doc.source,
                doc.content
            ));
        }
        prompt.push_str(&format!("\nQuestion: {}", query));
        prompt
    }

    // ==================== Multi-Agent Red Team ====================

    pub fn architect_instruction() -> &'static str {
        "You are the Architect. Propose the strongest, most complete position or solution \
         for the debate prompt below. Be concrete and explain your reasoning."
    }

    pub fn skeptic_instruction() -> &'static str {
        "You are the Skeptic. Critically examine the Architect's proposal below. Identify \
         flaws, unsupported claims, risks and counterarguments."
    }

    pub fn judge_instruction() -> &'static str {
        "You are the Judge. Weigh the Architect's proposal against the Skeptic's critique. \
         State clearly whether you agree with the Architect or with the Skeptic, then give \
         the final, balanced answer."
    }

    pub fn architect_prompt(instruction: &str, prompt: &str) -> String {
        format!("{}\n\nDebate prompt:\n{}", instruction, prompt)
    }

    pub fn skeptic_prompt(instruction: &str, prompt: &str, architect: &str) -> String {
        format!(
            "{}\n\nDebate prompt:\n{}\n\nArchitect's proposal:\n{}",
            instruction, prompt, architect
        )
    }

    pub fn judge_prompt(instruction: &str, prompt: &str, architect: &str, skeptic: &str) -> String {
        format!(
            "{}\n\nDebate prompt:\n{}\n\nArchitect's proposal:\n{}\n\nSkeptic's critique:\n{}",
            instruction, prompt, architect, skeptic
        )
    }

    // ==================== Tool-Calling Verification ====================

    pub fn tool_verification_prompt(prompt: &str) -> String {
        format!(
            r#"{}

If any claim in your answer should be verified, request exactly one tool call by including
a JSON object of the form {{"tool": "<tool name>", "parameters": {{...}}}} in your reply."#,
            prompt
        )
    }

    pub fn tool_revision_prompt(prompt: &str, initial: &str, tool_result: &str) -> String {
        format!(
            r#"Original prompt:
{}

Your initial answer:
{}

Tool result:
{}

Revise your answer so that it is consistent with the tool result. Do not request further tool calls."#,
            prompt, initial, tool_result
        )
    }

    // ==================== Self-Critique Loop ====================

    pub fn critique_prompt(prompt: &str, answer: &str) -> String {
        format!(
            r#"Critique the following answer to the prompt. List factual errors, weak reasoning,
missing counterarguments and unclear passages.

Prompt:
{}

Answer:
{}"#,
            prompt, answer
        )
    }

    pub fn revision_prompt(prompt: &str, answer: &str, critique: &str) -> String {
        format!(
            r#"Revise the answer to address every point in the critique. Return only the improved answer.

Prompt:
{}

Answer:
{}

Critique:
{}"#,
            prompt, answer, critique
        )
    }

    // ==================== Confidence Scoring ====================

    pub fn confidence_prompt(prompt: &str) -> String {
        format!(
            "{}\n\nAfter your answer, add a final line \"Confidence: NN\" where NN is your \
             confidence (0-100) that the answer is correct.",
            prompt
        )
    }

    pub fn confidence_improvement_prompt(prompt: &str, answer: &str, confidence: f64) -> String {
        format!(
            r#"Your previous answer had a confidence of {:.0}/100. Strengthen it: fix weak points,
add supporting evidence and remove claims you cannot support.

Prompt:
{}

Previous answer:
{}

End with a final line "Confidence: NN"."#,
            confidence, prompt, answer
        )
    }

    // ==================== Constitutional Prompting ====================

    pub fn default_principles() -> Vec<String> {
        vec![
            "Be truthful and do not state unsupported claims as fact".to_string(),
            "Treat opposing participants with respect; attack arguments, not people".to_string(),
            "Avoid content that is harmful, hateful or discriminatory".to_string(),
            "Acknowledge uncertainty and credible counterarguments".to_string(),
        ]
    }

    pub fn constitutional_critique_prompt(prompt: &str, answer: &str, principles: &[String]) -> String {
        let list = numbered(principles);
        format!(
            r#"Check the answer against these principles:
{}

Prompt:
{}

Answer:
{}

List each violation with the principle it breaks. If there are none, reply exactly "NO VIOLATIONS"."#,
            list, prompt, answer
        )
    }

    pub fn constitutional_revision_prompt(
        prompt: &str,
        answer: &str,
        critique: &str,
        principles: &[String],
    ) -> String {
        format!(
            r#"Rewrite the answer so that it no longer violates the principles. Return only the rewritten answer.

Principles:
{}

Prompt:
{}

Answer:
{}

Violations:
{}"#,
            numbered(principles),
            prompt,
            answer,
            critique
        )
    }

    // ==================== Ensemble Voting ====================

    pub fn ensemble_vote_prompt(prompt: &str, candidates: &[String]) -> String {
        let mut vote = format!(
            "Several candidate answers were written for this prompt:\n\n{}\n\nCandidates:\n",
            prompt
        );
        for (i, candidate) in candidates.iter().enumerate() {
            vote.push_str(&format!("\n--- Candidate {} ---\n{}\n", i + 1, candidate));
        }
        vote.push_str("\nReply with the number of the best candidate, then one sentence explaining why.");
        vote
    }

    // ==================== Tree of Thoughts ====================

    pub fn thought_generation_prompt(prompt: &str, branch_count: usize) -> String {
        format!(
            "Propose {} distinct approaches to answering the prompt below. Number them 1 to {} \
             and describe each in two or three sentences.\n\nPrompt:\n{}",
            branch_count, branch_count, prompt
        )
    }

    pub fn thought_evaluation_prompt(prompt: &str, branches: &[String]) -> String {
        format!(
            "Evaluate these approaches to the prompt for soundness, persuasiveness and evidence. \
             Reply with the number of the most promising approach first.\n\nPrompt:\n{}\n\nApproaches:\n{}",
            prompt,
            numbered(branches)
        )
    }

    pub fn solution_expansion_prompt(prompt: &str, branch: &str) -> String {
        format!(
            "Develop the following approach into a complete answer.\n\nPrompt:\n{}\n\nApproach:\n{}",
            prompt, branch
        )
    }

    // ==================== Step-Back Prompting ====================

    pub fn step_back_instruction() -> &'static str {
        "Before answering, step back: what general principles, concepts or background \
         knowledge govern this question? List them concisely without answering the question itself."
    }

    pub fn step_back_abstraction_prompt(instruction: &str, prompt: &str) -> String {
        format!("{}\n\nQuestion:\n{}", instruction, prompt)
    }

    pub fn step_back_grounded_prompt(prompt: &str, principles: &str) -> String {
        format!(
            "Using the principles below, answer the question.\n\nPrinciples:\n{}\n\nQuestion:\n{}",
            principles, prompt
        )
    }

    // ==================== Prompt Chaining ====================

    pub fn default_chain() -> Vec<String> {
        vec![
            "Outline the key points and evidence relevant to the prompt.".to_string(),
            "Develop the outline into a structured argument.".to_string(),
            "Polish the argument into a clear, persuasive final answer.".to_string(),
        ]
    }

    pub fn chain_step_prompt(prompt: &str, instruction: &str, previous: Option<&str>) -> String {
        match previous {
            Some(previous) => format!(
                "{}\n\nPrompt:\n{}\n\nPrevious step output:\n{}",
                instruction, prompt, previous
            ),
            None => format!("{}\n\nPrompt:\n{}", instruction, prompt),
        }
    }
}

fn numbered(items: &[String]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rag_answer_prompt_numbers_documents() {
        let docs = vec![
            Document::new("a", "First", "alpha", "wiki"),
            Document::new("b", "Second", "beta", "news"),
        ];
        let prompt = FlowPromptTemplate::rag_answer_prompt("Why?", &docs);
        assert!(prompt.contains("[1] First (wiki)"));
        assert!(prompt.contains("[2] Second (news)"));
        assert!(prompt.ends_with("Question: Why?"));
    }

    #[test]
    fn test_tool_verification_prompt_escapes_braces() {
        let prompt = FlowPromptTemplate::tool_verification_prompt("Is it true?");
        assert!(prompt.contains(r#"{"tool": "<tool name>", "parameters": {...}}"#));
    }

    #[test]
    fn test_chain_step_prompt_includes_previous() {
        let first = FlowPromptTemplate::chain_step_prompt("P", "Outline", None);
        assert!(!first.contains("Previous step output"));
        let second = FlowPromptTemplate::chain_step_prompt("P", "Argue", Some("outline"));
        assert!(second.contains("Previous step output:\noutline"));
    }
}
