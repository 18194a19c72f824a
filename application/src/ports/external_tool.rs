//! External tool port
//!
//! A tool adapter is identified by its unique [`tool_name`](ExternalToolPort::tool_name);
//! the tool-calling verification flow dispatches to the adapter whose name
//! matches the model's request exactly.

use crate::ports::service_error::ServiceError;
use async_trait::async_trait;
use flow_domain::{ToolCall, ToolCallResult, ToolDefinition};

#[async_trait]
pub trait ExternalToolPort: Send + Sync {
    /// Unique name the model uses to request this tool
    fn tool_name(&self) -> &str;

    /// Definition advertised to the model.
    ///
    /// The default has no description and an empty parameter schema.
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.tool_name(), "")
    }

    /// Execute one invocation
    async fn execute_tool_call(&self, call: &ToolCall) -> Result<ToolCallResult, ServiceError>;
}
