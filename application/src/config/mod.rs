//! Application-level configuration.
//!
//! - [`ProcessorSettings`] - per-call timeout for flow processors
//! - [`AnalyticsSettings`] - analytics worker pool and deadlines
//! - [`RecommendationSettings`] - scoring weights and comparison deadline

pub mod engine_config;

pub use engine_config::{
    AnalyticsSettings, EngineConfig, ProcessorSettings, RecommendationSettings,
};
