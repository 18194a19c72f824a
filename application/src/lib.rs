//! Application layer for agentic-flow
//!
//! This crate contains the flow processors and their registry, the analytics
//! and recommendation use cases, port definitions, and engine configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod flows;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{AnalyticsSettings, EngineConfig, ProcessorSettings, RecommendationSettings};
pub use flows::{
    processor::{FlowError, FlowProcessor},
    registry::{AgenticFlowRegistry, FlowRegistryError},
    services::FlowServices,
};
pub use ports::{
    analytics_repository::{AgenticFlowAnalyticsRepository, RepositoryError},
    external_tool::ExternalToolPort,
    flow_event_logger::{FlowEvent, FlowEventLogger, NoFlowEventLogger},
    llm_service::{GenerationParams, LlmResponse, LlmServicePort},
    rag_service::RagServicePort,
    service_error::ServiceError,
};
pub use use_cases::analytics::{
    AgenticFlowAnalyticsService, AnalyticsError, ExecutionRecordRequest,
};
pub use use_cases::recommendation::{FlowRecommendationService, RecommendationError};
