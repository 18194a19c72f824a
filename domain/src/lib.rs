//! Domain layer for the agentic flow engine
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Agentic Flow
//!
//! A named, pluggable multi-step reasoning/verification strategy applied to
//! one LLM turn of a debate:
//!
//! - **Input**: prompt + [`AgenticFlowConfiguration`] + [`PromptContext`]
//! - **Output**: an immutable [`AgenticFlowResult`] with ordered [`ProcessingStep`]s
//!
//! ## Analytics / Recommendation
//!
//! - **Execution**: append-only audit record of one flow invocation
//! - **Trend Score**: weighted composite of usage, confidence and success rate
//! - **Switch Urgency**: how urgently a participant should change flow type

pub mod analytics;
pub mod core;
pub mod flow;
pub mod prompt;
pub mod recommendation;

// Re-export commonly used types
pub use analytics::{
    aggregate::{
        DebateFlowSummary, FlowTypeAnalytics, FlowTypeTrend, analytics_by_flow_type,
        compute_trends, window_start,
    },
    execution::{AgenticFlowExecution, FlowPerformanceMetrics, ResponseImprovement},
};
pub use core::error::DomainError;
pub use flow::{
    configuration::AgenticFlowConfiguration,
    context::PromptContext,
    document::Document,
    flow_type::AgenticFlowType,
    result::{AgenticFlowResult, AgenticFlowResultBuilder, FlowStatus, ProcessingStep},
    rules::{PostProcessed, PostProcessingRules},
    tool::{ToolCall, ToolCallResult, ToolDefinition},
};
pub use prompt::FlowPromptTemplate;
pub use recommendation::{
    context::{Complexity, DebateContext, ParticipantContext, PerformanceContext},
    scoring::{RecommendationWeights, analyze_performance},
    value_objects::{
        AdaptiveFlowRecommendation, FlowRecommendation, FlowTypeRecommendation,
        PerformanceAnalysis, SwitchUrgency,
    },
};
