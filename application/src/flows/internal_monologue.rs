//! Internal Monologue: one chain-of-thought call, split on `Final Answer:`.

use crate::flows::processor::{FlowError, FlowProcessor};
use crate::flows::services::{BoundedLlm, FlowServices};
use async_trait::async_trait;
use flow_domain::flow::parsing::split_final_answer;
use flow_domain::flow::result::METRIC_VISUALIZATION_TYPE;
use flow_domain::{
    AgenticFlowConfiguration, AgenticFlowResult, AgenticFlowType, FlowPromptTemplate,
    ProcessingStep, PromptContext,
};

pub const STEP_INTERNAL_MONOLOGUE: &str = "internal_monologue";

pub struct InternalMonologueProcessor {
    llm: BoundedLlm,
}

impl InternalMonologueProcessor {
    pub fn new(services: &FlowServices) -> Self {
        Self {
            llm: services.bounded_llm(),
        }
    }
}

#[async_trait]
impl FlowProcessor for InternalMonologueProcessor {
    fn flow_type(&self) -> AgenticFlowType {
        AgenticFlowType::InternalMonologue
    }

    fn validate_configuration(&self, configuration: &AgenticFlowConfiguration) -> bool {
        configuration.is_optional_string("prefix")
    }

    async fn execute(
        &self,
        prompt: &str,
        configuration: &AgenticFlowConfiguration,
        _context: &PromptContext,
    ) -> Result<AgenticFlowResult, FlowError> {
        let prefix = configuration
            .get_str("prefix")
            .unwrap_or(FlowPromptTemplate::internal_monologue_prefix());
        let enhanced_prompt = format!("{}\n\n{}", prompt, prefix);

        let response = self.llm.generate_with_internal_monologue(&enhanced_prompt).await?;
        let split = split_final_answer(&response.text);
        let has_reasoning = !split.reasoning.is_empty();

        Ok(AgenticFlowResult::builder(prompt)
            .enhanced_prompt(enhanced_prompt)
            .full_response(response.text.clone())
            .final_response(split.final_answer)
            .reasoning(split.reasoning)
            .step(
                ProcessingStep::new(STEP_INTERNAL_MONOLOGUE, response.text)
                    .with_metadata("marker_found", split.marker_found),
            )
            .metric("has_reasoning", has_reasoning)
            .metric("processing_time_ms", response.processing_time.as_millis() as u64)
            .metric(METRIC_VISUALIZATION_TYPE, "internal_monologue")
            .response_changed(has_reasoning)
            .build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flows::test_support::{ScriptedLlm, context, services};
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_splits_on_final_answer_marker() {
        let llm = Arc::new(ScriptedLlm::texts(&["A\n\nB\n\nFinal Answer: C"]));
        let processor = InternalMonologueProcessor::new(&services(llm.clone()));

        let result = processor
            .process("Should we?", &AgenticFlowConfiguration::new(), &context())
            .await;

        assert_eq!(result.reasoning(), "A\n\nB");
        assert_eq!(result.final_response(), "C");
        assert_eq!(result.full_response(), "A\n\nB\n\nFinal Answer: C");
        assert_eq!(result.step_types(), vec![STEP_INTERNAL_MONOLOGUE]);
        assert_eq!(result.metric("has_reasoning"), Some(&json!(true)));
        assert!(result.response_changed());
        assert!(llm.prompts()[0].starts_with("Should we?\n\n"));
    }

    #[tokio::test]
    async fn test_missing_marker_reuses_whole_text() {
        let llm = Arc::new(ScriptedLlm::texts(&["Just an answer."]));
        let processor = InternalMonologueProcessor::new(&services(llm));

        let result = processor
            .process("Q", &AgenticFlowConfiguration::new(), &context())
            .await;

        assert_eq!(result.reasoning(), "Just an answer.");
        assert_eq!(result.final_response(), "Just an answer.");
        assert_eq!(result.processing_steps().len(), 1);
    }

    #[tokio::test]
    async fn test_custom_prefix() {
        let llm = Arc::new(ScriptedLlm::texts(&["Final Answer: yes"]));
        let processor = InternalMonologueProcessor::new(&services(llm.clone()));
        let configuration = AgenticFlowConfiguration::new().with_parameter("prefix", "Think hard.");

        let result = processor.process("Q", &configuration, &context()).await;

        assert_eq!(result.enhanced_prompt(), "Q\n\nThink hard.");
        assert_eq!(llm.prompts(), vec!["Q\n\nThink hard.".to_string()]);
        assert_eq!(result.final_response(), "yes");
        assert!(!result.response_changed());
    }

    #[tokio::test]
    async fn test_llm_failure_is_contained() {
        let llm = Arc::new(ScriptedLlm::failing("down"));
        let processor = InternalMonologueProcessor::new(&services(llm));

        let result = processor
            .process("Q", &AgenticFlowConfiguration::new(), &context())
            .await;

        assert!(result.is_error());
        assert!(!result.response_changed());
    }

    #[test]
    fn test_validate_configuration() {
        let processor =
            InternalMonologueProcessor::new(&services(Arc::new(ScriptedLlm::texts(&[]))));
        assert!(processor.validate_configuration(&AgenticFlowConfiguration::new()));
        assert!(
            !processor.validate_configuration(&AgenticFlowConfiguration::new().with_parameter("prefix", 3))
        );
    }
}
