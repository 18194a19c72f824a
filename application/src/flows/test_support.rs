//! Scripted port doubles shared by the processor tests.

use crate::flows::services::FlowServices;
use crate::ports::external_tool::ExternalToolPort;
use crate::ports::llm_service::{GenerationParams, LlmResponse, LlmServicePort};
use crate::ports::rag_service::RagServicePort;
use crate::ports::service_error::ServiceError;
use async_trait::async_trait;
use flow_domain::{Document, PromptContext, ToolCall, ToolCallResult, ToolDefinition};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// A scripted reply for the mock LLM
#[derive(Debug, Clone)]
pub enum Scripted {
    Text(String),
    Error(String),
    /// Never completes
    Hang,
}

impl Scripted {
    pub fn text(text: &str) -> Self {
        Scripted::Text(text.to_string())
    }
}

/// Mock LLM that returns scripted replies in order and records prompts
pub struct ScriptedLlm {
    responses: Mutex<VecDeque<Scripted>>,
    /// Reply once the script is exhausted
    fallback: Scripted,
    prompts: Mutex<Vec<String>>,
    offered_tools: Mutex<Vec<Vec<String>>>,
    temperatures: Mutex<Vec<Option<f64>>>,
}

impl ScriptedLlm {
    pub fn new(responses: Vec<Scripted>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            fallback: Scripted::text("(no more responses)"),
            prompts: Mutex::new(Vec::new()),
            offered_tools: Mutex::new(Vec::new()),
            temperatures: Mutex::new(Vec::new()),
        }
    }

    pub fn texts(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Scripted::text(t)).collect())
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fallback: Scripted::Error(message.to_string()),
            ..Self::new(Vec::new())
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn offered_tools(&self) -> Vec<Vec<String>> {
        self.offered_tools.lock().unwrap().clone()
    }

    pub fn temperatures(&self) -> Vec<Option<f64>> {
        self.temperatures.lock().unwrap().clone()
    }

    async fn respond(&self, prompt: &str, params: &GenerationParams) -> Result<LlmResponse, ServiceError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.temperatures.lock().unwrap().push(params.temperature);
        let next = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        match next {
            Scripted::Text(text) => Ok(LlmResponse::new(text)),
            Scripted::Error(message) => Err(ServiceError::RequestFailed(message)),
            Scripted::Hang => std::future::pending().await,
        }
    }
}

#[async_trait]
impl LlmServicePort for ScriptedLlm {
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<LlmResponse, ServiceError> {
        self.respond(prompt, params).await
    }

    async fn generate_with_internal_monologue(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<LlmResponse, ServiceError> {
        self.respond(prompt, params).await
    }

    async fn generate_with_tool_calling(
        &self,
        prompt: &str,
        params: &GenerationParams,
        tools: &[ToolDefinition],
    ) -> Result<LlmResponse, ServiceError> {
        self.offered_tools
            .lock()
            .unwrap()
            .push(tools.iter().map(|t| t.name.clone()).collect());
        self.respond(prompt, params).await
    }
}

/// Mock retrieval returning a fixed document set (or an error)
pub struct ScriptedRag {
    documents: Result<Vec<Document>, String>,
    queries: Mutex<Vec<(String, usize)>>,
}

impl ScriptedRag {
    pub fn with_documents(documents: Vec<Document>) -> Self {
        Self {
            documents: Ok(documents),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self::with_documents(Vec::new())
    }

    pub fn failing(message: &str) -> Self {
        Self {
            documents: Err(message.to_string()),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<(String, usize)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl RagServicePort for ScriptedRag {
    async fn retrieve_documents(
        &self,
        query: &str,
        count: usize,
    ) -> Result<Vec<Document>, ServiceError> {
        self.queries.lock().unwrap().push((query.to_string(), count));
        match &self.documents {
            Ok(documents) => Ok(documents.iter().take(count).cloned().collect()),
            Err(message) => Err(ServiceError::ConnectionError(message.clone())),
        }
    }
}

/// Mock tool that records every invocation
pub struct RecordingTool {
    name: String,
    result: Result<Value, String>,
    calls: Mutex<Vec<ToolCall>>,
}

impl RecordingTool {
    pub fn new(name: &str, result: Value) -> Self {
        Self {
            name: name.to_string(),
            result: Ok(result),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            result: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<ToolCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExternalToolPort for RecordingTool {
    fn tool_name(&self) -> &str {
        &self.name
    }

    async fn execute_tool_call(&self, call: &ToolCall) -> Result<ToolCallResult, ServiceError> {
        self.calls.lock().unwrap().push(call.clone());
        match &self.result {
            Ok(value) => Ok(ToolCallResult::success(&self.name, value.clone())),
            Err(message) => Err(ServiceError::RequestFailed(message.clone())),
        }
    }
}

pub fn services(llm: Arc<ScriptedLlm>) -> FlowServices {
    FlowServices::new(llm, Arc::new(ScriptedRag::empty()))
}

pub fn context() -> PromptContext {
    PromptContext::new("debate-1", "participant-1").with_organization("org-1")
}
