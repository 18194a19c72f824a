//! Infrastructure layer for agentic-flow
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: configuration file loading, analytics
//! storage, and structured flow event logging.

pub mod config;
pub mod logging;
pub mod storage;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileAnalyticsConfig, FileConfig, FileEngineConfig,
    FileLoggingConfig, FileRecommendationConfig, FileStorageConfig, FileWeightsConfig,
};
pub use logging::JsonlFlowEventLogger;
pub use storage::{InMemoryAnalyticsRepository, JsonlAnalyticsRepository};
