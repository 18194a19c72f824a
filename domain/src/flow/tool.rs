//! External tool value objects used by tool-calling verification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Definition of a tool offered to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique tool name (e.g. "web_search")
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// JSON schema of the parameters object
    #[serde(default)]
    pub parameters: Value,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: serde_json::json!({"type": "object"}),
        }
    }

    pub fn with_parameters(mut self, schema: Value) -> Self {
        self.parameters = schema;
        self
    }
}

/// A tool invocation extracted from model output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub tool: String,
    #[serde(default)]
    pub parameters: Value,
}

impl ToolCall {
    pub fn new(tool: impl Into<String>, parameters: Value) -> Self {
        Self {
            tool: tool.into(),
            parameters,
        }
    }
}

/// Structured result of a tool invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallResult {
    pub tool_name: String,
    pub result: Value,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
}

impl ToolCallResult {
    pub fn success(tool_name: impl Into<String>, result: Value) -> Self {
        Self {
            tool_name: tool_name.into(),
            result,
            success: true,
            timestamp: Utc::now(),
        }
    }

    pub fn failure(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            result: Value::String(message.into()),
            success: false,
            timestamp: Utc::now(),
        }
    }
}
