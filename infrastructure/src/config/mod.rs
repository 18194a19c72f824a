//! Configuration file loading for agentic-flow
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `AGENTIC_FLOW_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./agentic-flow.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/agentic-flow/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileAnalyticsConfig, FileConfig, FileEngineConfig, FileLoggingConfig,
    FileRecommendationConfig, FileStorageConfig, FileWeightsConfig,
};
pub use loader::ConfigLoader;
