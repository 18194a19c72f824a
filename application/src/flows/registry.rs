//! Flow registry: the single lookup point from flow type to processor.

use crate::flows::confidence_scoring::ConfidenceScoringProcessor;
use crate::flows::constitutional::ConstitutionalProcessor;
use crate::flows::ensemble_voting::EnsembleVotingProcessor;
use crate::flows::internal_monologue::InternalMonologueProcessor;
use crate::flows::post_processing::PostProcessingProcessor;
use crate::flows::processor::FlowProcessor;
use crate::flows::prompt_chaining::PromptChainingProcessor;
use crate::flows::rag_reranking::RagRerankingProcessor;
use crate::flows::red_team::RedTeamProcessor;
use crate::flows::self_critique::SelfCritiqueProcessor;
use crate::flows::services::FlowServices;
use crate::flows::step_back::StepBackProcessor;
use crate::flows::tool_verification::ToolVerificationProcessor;
use crate::flows::tree_of_thoughts::TreeOfThoughtsProcessor;
use flow_domain::AgenticFlowType;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowRegistryError {
    #[error("No processor registered for flow type {0}")]
    NotRegistered(AgenticFlowType),
}

/// Maps each [`AgenticFlowType`] to its processor
#[derive(Clone, Default)]
pub struct AgenticFlowRegistry {
    processors: BTreeMap<AgenticFlowType, Arc<dyn FlowProcessor>>,
}

impl AgenticFlowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with one processor for every flow type
    pub fn with_default_processors(services: &FlowServices) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(InternalMonologueProcessor::new(services)));
        registry.register(Arc::new(SelfCritiqueProcessor::new(services)));
        registry.register(Arc::new(RedTeamProcessor::new(services)));
        registry.register(Arc::new(RagRerankingProcessor::new(services)));
        registry.register(Arc::new(ToolVerificationProcessor::new(services)));
        registry.register(Arc::new(ConfidenceScoringProcessor::new(services)));
        registry.register(Arc::new(ConstitutionalProcessor::new(services)));
        registry.register(Arc::new(EnsembleVotingProcessor::new(services)));
        registry.register(Arc::new(PostProcessingProcessor::new(services)));
        registry.register(Arc::new(TreeOfThoughtsProcessor::new(services)));
        registry.register(Arc::new(StepBackProcessor::new(services)));
        registry.register(Arc::new(PromptChainingProcessor::new(services)));
        registry
    }

    /// Register under the processor's own flow type, returning any processor it replaces
    pub fn register(&mut self, processor: Arc<dyn FlowProcessor>) -> Option<Arc<dyn FlowProcessor>> {
        let flow_type = processor.flow_type();
        debug!("Registering processor for {}", flow_type);
        self.processors.insert(flow_type, processor)
    }

    pub fn get(&self, flow_type: AgenticFlowType) -> Result<Arc<dyn FlowProcessor>, FlowRegistryError> {
        self.processors
            .get(&flow_type)
            .cloned()
            .ok_or(FlowRegistryError::NotRegistered(flow_type))
    }

    pub fn contains(&self, flow_type: AgenticFlowType) -> bool {
        self.processors.contains_key(&flow_type)
    }

    pub fn registered_types(&self) -> Vec<AgenticFlowType> {
        self.processors.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flows::test_support::{RecordingTool, ScriptedLlm, ScriptedRag, context, services};
    use flow_domain::AgenticFlowConfiguration;
    use serde_json::json;

    #[test]
    fn test_default_registry_covers_every_flow_type() {
        let registry =
            AgenticFlowRegistry::with_default_processors(&services(Arc::new(ScriptedLlm::texts(&[]))));
        assert_eq!(registry.len(), AgenticFlowType::all().len());
        for flow_type in AgenticFlowType::all() {
            let processor = registry.get(*flow_type).unwrap();
            assert_eq!(processor.flow_type(), *flow_type);
            assert!(processor.validate_configuration(&AgenticFlowConfiguration::new()));
        }
    }

    #[test]
    fn test_missing_processor() {
        let registry = AgenticFlowRegistry::new();
        assert!(registry.is_empty());
        assert!(!registry.contains(AgenticFlowType::TreeOfThoughts));
        assert_eq!(
            registry.get(AgenticFlowType::TreeOfThoughts).err(),
            Some(FlowRegistryError::NotRegistered(AgenticFlowType::TreeOfThoughts))
        );
    }

    #[test]
    fn test_register_replaces() {
        let flow_services = services(Arc::new(ScriptedLlm::texts(&[])));
        let mut registry = AgenticFlowRegistry::new();
        assert!(registry.register(Arc::new(StepBackProcessor::new(&flow_services))).is_none());
        assert!(registry.register(Arc::new(StepBackProcessor::new(&flow_services))).is_some());
        assert_eq!(registry.registered_types(), vec![AgenticFlowType::StepBackPrompting]);
    }

    #[test]
    fn test_validate_configuration_never_panics_on_malformed_input() {
        let registry =
            AgenticFlowRegistry::with_default_processors(&services(Arc::new(ScriptedLlm::texts(&[]))));
        let malformed = [
            json!(null),
            json!(-1),
            json!(1e300),
            json!("text"),
            json!([null, 1, "x"]),
            json!({"nested": {"deep": true}}),
        ];
        let names = [
            "prefix",
            "initial_retrieval_count",
            "final_document_count",
            "reranking_criteria",
            "tools",
            "iterations",
            "confidence_threshold",
            "principles",
            "ensemble_size",
            "max_length",
            "branch_count",
            "chain",
            "judge_prompt",
        ];
        for flow_type in AgenticFlowType::all() {
            let processor = registry.get(*flow_type).unwrap();
            for name in names {
                for value in &malformed {
                    let configuration =
                        AgenticFlowConfiguration::new().with_parameter(name, value.clone());
                    let first = processor.validate_configuration(&configuration);
                    assert_eq!(first, processor.validate_configuration(&configuration));
                }
            }
        }
    }

    #[tokio::test]
    async fn test_no_processor_fails_under_port_failures() {
        let llm = Arc::new(ScriptedLlm::failing("provider down"));
        let flow_services = FlowServices::new(llm, Arc::new(ScriptedRag::failing("index down")))
            .with_tool(Arc::new(RecordingTool::failing("web_search", "tool down")));
        let registry = AgenticFlowRegistry::with_default_processors(&flow_services);

        for flow_type in AgenticFlowType::all() {
            let processor = registry.get(*flow_type).unwrap();
            let result = processor
                .process("Prompt", &AgenticFlowConfiguration::new(), &context())
                .await;
            assert!(result.is_error(), "{} did not report failure", flow_type);
            assert!(!result.response_changed());
            assert!(!result.final_response().is_empty());
        }
    }
}
