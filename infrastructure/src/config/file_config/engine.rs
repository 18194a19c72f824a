//! Engine configuration from TOML (`[engine]` section)

use super::{ConfigValidationError, MAX_DEADLINE_SECS, check_range};
use flow_application::ProcessorSettings;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw flow processor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEngineConfig {
    /// Upper bound on each LLM, RAG or tool call
    pub call_timeout_secs: u64,
}

impl Default for FileEngineConfig {
    fn default() -> Self {
        Self {
            call_timeout_secs: ProcessorSettings::default().call_timeout.as_secs(),
        }
    }
}

impl FileEngineConfig {
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut issues = Vec::new();
        check_range(
            "engine.call_timeout_secs",
            self.call_timeout_secs,
            MAX_DEADLINE_SECS,
            &mut issues,
        );
        issues
    }

    pub fn to_settings(&self) -> ProcessorSettings {
        ProcessorSettings::default().with_call_timeout(Duration::from_secs(self.call_timeout_secs))
    }
}
