//! LLM service port
//!
//! Defines the interface flow processors use to talk to a language model.
//! Provider implementations live outside this crate.

use crate::ports::service_error::ServiceError;
use async_trait::async_trait;
use flow_domain::ToolDefinition;
use std::time::Duration;

/// Sampling parameters for a single generation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationParams {
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

impl GenerationParams {
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Raw model output
#[derive(Debug, Clone, PartialEq)]
pub struct LlmResponse {
    pub text: String,
    pub processing_time: Duration,
}

impl LlmResponse {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            processing_time: Duration::ZERO,
        }
    }

    pub fn with_processing_time(mut self, processing_time: Duration) -> Self {
        self.processing_time = processing_time;
        self
    }
}

/// Port for LLM generation
///
/// Each method is a single request/response exchange; callers bound it with
/// their own timeout.
#[async_trait]
pub trait LlmServicePort: Send + Sync {
    /// Plain completion
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<LlmResponse, ServiceError>;

    /// Completion using the provider's chain-of-thought capability
    async fn generate_with_internal_monologue(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<LlmResponse, ServiceError>;

    /// Completion with tool definitions attached and tool calling enabled
    async fn generate_with_tool_calling(
        &self,
        prompt: &str,
        params: &GenerationParams,
        tools: &[ToolDefinition],
    ) -> Result<LlmResponse, ServiceError>;
}
