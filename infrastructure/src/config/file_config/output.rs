//! File locations from TOML (`[storage]` and `[logging]` sections)

use super::ConfigValidationError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where executions are persisted. Unset means in-memory only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStorageConfig {
    pub execution_log: Option<PathBuf>,
}

impl FileStorageConfig {
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        empty_path(&self.execution_log, "storage.execution_log")
    }
}

/// Where structured flow events are written. Unset disables the event log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    pub flow_event_log: Option<PathBuf>,
}

impl FileLoggingConfig {
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        empty_path(&self.flow_event_log, "logging.flow_event_log")
    }
}

fn empty_path(path: &Option<PathBuf>, field: &'static str) -> Vec<ConfigValidationError> {
    match path {
        Some(path) if path.as_os_str().is_empty() => vec![ConfigValidationError::EmptyPath(field)],
        _ => vec![],
    }
}
