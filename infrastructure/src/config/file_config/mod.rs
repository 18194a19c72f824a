//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted to the application's
//! [`EngineConfig`] once validated.

mod analytics;
mod engine;
mod output;
mod recommendation;

pub use analytics::FileAnalyticsConfig;
pub use engine::FileEngineConfig;
pub use output::{FileLoggingConfig, FileStorageConfig};
pub use recommendation::{FileRecommendationConfig, FileWeightsConfig};

use flow_application::EngineConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A problem found by [`FileConfig::validate`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    #[error("{0} cannot be 0")]
    ZeroValue(&'static str),

    #[error("{field} cannot exceed {max}")]
    TooLarge { field: &'static str, max: u64 },

    #[error("recommendation.weights must be finite, non-negative and not all 0")]
    InvalidWeights,

    #[error("{0} cannot be an empty path")]
    EmptyPath(&'static str),
}

/// Longest accepted deadline or timeout, in seconds (one day)
pub const MAX_DEADLINE_SECS: u64 = 86_400;
/// Longest accepted trailing window, in days (ten years)
pub const MAX_WINDOW_DAYS: u32 = 3_650;
/// Largest accepted analytics worker pool
pub const MAX_CONCURRENT_TASKS: usize = 1_024;

/// Reject 0 and anything above `max` for a numeric setting.
fn check_range(
    field: &'static str,
    value: u64,
    max: u64,
    issues: &mut Vec<ConfigValidationError>,
) {
    if value == 0 {
        issues.push(ConfigValidationError::ZeroValue(field));
    } else if value > max {
        issues.push(ConfigValidationError::TooLarge { field, max });
    }
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Flow processor limits
    pub engine: FileEngineConfig,
    /// Analytics worker pool
    pub analytics: FileAnalyticsConfig,
    /// Recommendation scoring
    pub recommendation: FileRecommendationConfig,
    /// Execution log location
    pub storage: FileStorageConfig,
    /// Flow event log location
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut issues = Vec::new();
        issues.extend(self.engine.validate());
        issues.extend(self.analytics.validate());
        issues.extend(self.recommendation.validate());
        issues.extend(self.storage.validate());
        issues.extend(self.logging.validate());
        issues
    }

    /// Convert to the application's runtime configuration
    pub fn to_engine_config(&self) -> EngineConfig {
        EngineConfig {
            processor: self.engine.to_settings(),
            analytics: self.analytics.to_settings(),
            recommendation: self.recommendation.to_settings(),
        }
    }
}
