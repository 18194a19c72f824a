//! Agentic flow processors
//!
//! One processor per [`AgenticFlowType`](flow_domain::AgenticFlowType), all
//! behind the [`FlowProcessor`](processor::FlowProcessor) contract and
//! resolved through the [`AgenticFlowRegistry`](registry::AgenticFlowRegistry).
//!
//! | Processor | Port calls (sequential) |
//! |-----------|-------------------------|
//! | Internal Monologue | 1 |
//! | RAG with Re-ranking | retrieval + up to 2 |
//! | Multi-Agent Red Team | 3 |
//! | Tool-Calling Verification | 1, or 2 + one tool call |
//! | Self-Critique Loop | 1 + 2 per iteration |
//! | Confidence Scoring | 1 or 2 |
//! | Constitutional Prompting | 2 or 3 |
//! | Ensemble Voting | ensemble size + 1 |
//! | Post-Processing Rules | 1 |
//! | Tree of Thoughts | 3 |
//! | Step-Back Prompting | 2 |
//! | Prompt Chaining | chain length |

pub mod confidence_scoring;
pub mod constitutional;
pub mod ensemble_voting;
pub mod internal_monologue;
pub mod post_processing;
pub mod processor;
pub mod prompt_chaining;
pub mod rag_reranking;
pub mod red_team;
pub mod registry;
pub mod self_critique;
pub mod services;
pub mod step_back;
pub mod tool_verification;
pub mod tree_of_thoughts;

#[cfg(test)]
pub(crate) mod test_support;
