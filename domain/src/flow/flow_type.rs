//! Agentic flow type definitions.
//!
//! [`AgenticFlowType`] is the closed set of reasoning/verification strategies
//! the engine knows about. Every processor, analytics record and
//! recommendation is keyed by one of these variants.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named multi-step reasoning or verification strategy applied to one LLM turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgenticFlowType {
    InternalMonologue,
    SelfCritiqueLoop,
    MultiAgentRedTeam,
    RagWithReranking,
    ToolCallingVerification,
    ConfidenceScoring,
    ConstitutionalPrompting,
    EnsembleVoting,
    PostProcessingRules,
    TreeOfThoughts,
    StepBackPrompting,
    PromptChaining,
}

impl AgenticFlowType {
    /// Every flow type, in declaration order.
    pub fn all() -> &'static [AgenticFlowType] {
        &[
            AgenticFlowType::InternalMonologue,
            AgenticFlowType::SelfCritiqueLoop,
            AgenticFlowType::MultiAgentRedTeam,
            AgenticFlowType::RagWithReranking,
            AgenticFlowType::ToolCallingVerification,
            AgenticFlowType::ConfidenceScoring,
            AgenticFlowType::ConstitutionalPrompting,
            AgenticFlowType::EnsembleVoting,
            AgenticFlowType::PostProcessingRules,
            AgenticFlowType::TreeOfThoughts,
            AgenticFlowType::StepBackPrompting,
            AgenticFlowType::PromptChaining,
        ]
    }

    /// Stable wire identifier (matches the serde representation)
    pub fn as_str(&self) -> &'static str {
        match self {
            AgenticFlowType::InternalMonologue => "INTERNAL_MONOLOGUE",
            AgenticFlowType::SelfCritiqueLoop => "SELF_CRITIQUE_LOOP",
            AgenticFlowType::MultiAgentRedTeam => "MULTI_AGENT_RED_TEAM",
            AgenticFlowType::RagWithReranking => "RAG_WITH_RERANKING",
            AgenticFlowType::ToolCallingVerification => "TOOL_CALLING_VERIFICATION",
            AgenticFlowType::ConfidenceScoring => "CONFIDENCE_SCORING",
            AgenticFlowType::ConstitutionalPrompting => "CONSTITUTIONAL_PROMPTING",
            AgenticFlowType::EnsembleVoting => "ENSEMBLE_VOTING",
            AgenticFlowType::PostProcessingRules => "POST_PROCESSING_RULES",
            AgenticFlowType::TreeOfThoughts => "TREE_OF_THOUGHTS",
            AgenticFlowType::StepBackPrompting => "STEP_BACK_PROMPTING",
            AgenticFlowType::PromptChaining => "PROMPT_CHAINING",
        }
    }

    /// Human-readable name for display
    pub fn display_name(&self) -> &'static str {
        match self {
            AgenticFlowType::InternalMonologue => "Internal Monologue",
            AgenticFlowType::SelfCritiqueLoop => "Self-Critique Loop",
            AgenticFlowType::MultiAgentRedTeam => "Multi-Agent Red Team",
            AgenticFlowType::RagWithReranking => "RAG with Re-ranking",
            AgenticFlowType::ToolCallingVerification => "Tool-Calling Verification",
            AgenticFlowType::ConfidenceScoring => "Confidence Scoring",
            AgenticFlowType::ConstitutionalPrompting => "Constitutional Prompting",
            AgenticFlowType::EnsembleVoting => "Ensemble Voting",
            AgenticFlowType::PostProcessingRules => "Post-Processing Rules",
            AgenticFlowType::TreeOfThoughts => "Tree of Thoughts",
            AgenticFlowType::StepBackPrompting => "Step-Back Prompting",
            AgenticFlowType::PromptChaining => "Prompt Chaining",
        }
    }

    /// One-line description of what the strategy does
    pub fn description(&self) -> &'static str {
        match self {
            AgenticFlowType::InternalMonologue => {
                "Chain-of-thought reasoning before committing to a final answer"
            }
            AgenticFlowType::SelfCritiqueLoop => {
                "Draft, critique and revise the answer over several iterations"
            }
            AgenticFlowType::MultiAgentRedTeam => {
                "Architect proposes, Skeptic attacks, Judge synthesizes"
            }
            AgenticFlowType::RagWithReranking => {
                "Retrieve documents, re-rank them by relevance and answer with citations"
            }
            AgenticFlowType::ToolCallingVerification => {
                "Verify claims with an external tool and revise the answer"
            }
            AgenticFlowType::ConfidenceScoring => {
                "Self-assess confidence and improve low-confidence answers"
            }
            AgenticFlowType::ConstitutionalPrompting => {
                "Check the answer against guiding principles and revise violations"
            }
            AgenticFlowType::EnsembleVoting => {
                "Generate several candidate answers and vote on the best"
            }
            AgenticFlowType::PostProcessingRules => {
                "Apply deterministic formatting and content rules to the answer"
            }
            AgenticFlowType::TreeOfThoughts => {
                "Explore alternative approaches, evaluate them and expand the best"
            }
            AgenticFlowType::StepBackPrompting => {
                "Identify the governing principles before answering the specific question"
            }
            AgenticFlowType::PromptChaining => {
                "Run a fixed chain of prompts, each building on the previous output"
            }
        }
    }
}

impl fmt::Display for AgenticFlowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AgenticFlowType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace(['-', ' '], "_");
        AgenticFlowType::all()
            .iter()
            .find(|t| t.as_str() == normalized)
            .copied()
            .ok_or_else(|| format!("Invalid AgenticFlowType: {}", s))
    }
}
