//! Service handles shared by the flow processors.

use crate::config::ProcessorSettings;
use crate::flows::processor::{FlowError, bounded};
use crate::ports::external_tool::ExternalToolPort;
use crate::ports::llm_service::{GenerationParams, LlmResponse, LlmServicePort};
use crate::ports::rag_service::RagServicePort;
use flow_domain::{Document, ToolDefinition};
use std::sync::Arc;
use std::time::Duration;

/// Every port a processor may need, plus the per-call settings
#[derive(Clone)]
pub struct FlowServices {
    pub llm: Arc<dyn LlmServicePort>,
    pub rag: Arc<dyn RagServicePort>,
    pub tools: Vec<Arc<dyn ExternalToolPort>>,
    pub settings: ProcessorSettings,
}

impl FlowServices {
    pub fn new(llm: Arc<dyn LlmServicePort>, rag: Arc<dyn RagServicePort>) -> Self {
        Self {
            llm,
            rag,
            tools: Vec::new(),
            settings: ProcessorSettings::default(),
        }
    }

    pub fn with_tool(mut self, tool: Arc<dyn ExternalToolPort>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn with_settings(mut self, settings: ProcessorSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn bounded_llm(&self) -> BoundedLlm {
        BoundedLlm::new(Arc::clone(&self.llm), &self.settings)
    }

    pub fn bounded_rag(&self) -> BoundedRag {
        BoundedRag::new(Arc::clone(&self.rag), &self.settings)
    }
}

/// LLM port with every call bounded by the call timeout
#[derive(Clone)]
pub struct BoundedLlm {
    llm: Arc<dyn LlmServicePort>,
    timeout: Duration,
}

impl BoundedLlm {
    pub fn new(llm: Arc<dyn LlmServicePort>, settings: &ProcessorSettings) -> Self {
        Self {
            llm,
            timeout: settings.call_timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn generate(&self, prompt: &str) -> Result<LlmResponse, FlowError> {
        self.generate_with(prompt, &GenerationParams::default()).await
    }

    pub async fn generate_with(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<LlmResponse, FlowError> {
        bounded(self.timeout, self.llm.generate(prompt, params)).await
    }

    pub async fn generate_with_internal_monologue(
        &self,
        prompt: &str,
    ) -> Result<LlmResponse, FlowError> {
        bounded(
            self.timeout,
            self.llm
                .generate_with_internal_monologue(prompt, &GenerationParams::default()),
        )
        .await
    }

    pub async fn generate_with_tool_calling(
        &self,
        prompt: &str,
        tools: &[ToolDefinition],
    ) -> Result<LlmResponse, FlowError> {
        bounded(
            self.timeout,
            self.llm
                .generate_with_tool_calling(prompt, &GenerationParams::default(), tools),
        )
        .await
    }
}

/// RAG port with retrieval bounded by the call timeout
#[derive(Clone)]
pub struct BoundedRag {
    rag: Arc<dyn RagServicePort>,
    timeout: Duration,
}

impl BoundedRag {
    pub fn new(rag: Arc<dyn RagServicePort>, settings: &ProcessorSettings) -> Self {
        Self {
            rag,
            timeout: settings.call_timeout,
        }
    }

    pub async fn retrieve_documents(
        &self,
        query: &str,
        count: usize,
    ) -> Result<Vec<Document>, FlowError> {
        bounded(self.timeout, self.rag.retrieve_documents(query, count)).await
    }
}
