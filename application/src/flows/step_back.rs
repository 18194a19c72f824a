//! Step-Back Prompting: name the governing principles first, then answer
//! grounded in them.

use crate::flows::processor::{FlowError, FlowProcessor};
use crate::flows::services::{BoundedLlm, FlowServices};
use async_trait::async_trait;
use flow_domain::flow::result::METRIC_VISUALIZATION_TYPE;
use flow_domain::{
    AgenticFlowConfiguration, AgenticFlowResult, AgenticFlowType, FlowPromptTemplate,
    ProcessingStep, PromptContext,
};

pub const STEP_ABSTRACTION: &str = "step_back_abstraction";
pub const STEP_GROUNDED_RESPONSE: &str = "grounded_response";

pub struct StepBackProcessor {
    llm: BoundedLlm,
}

impl StepBackProcessor {
    pub fn new(services: &FlowServices) -> Self {
        Self {
            llm: services.bounded_llm(),
        }
    }
}

#[async_trait]
impl FlowProcessor for StepBackProcessor {
    fn flow_type(&self) -> AgenticFlowType {
        AgenticFlowType::StepBackPrompting
    }

    fn validate_configuration(&self, configuration: &AgenticFlowConfiguration) -> bool {
        configuration.is_optional_string("abstraction_prompt")
    }

    async fn execute(
        &self,
        prompt: &str,
        configuration: &AgenticFlowConfiguration,
        _context: &PromptContext,
    ) -> Result<AgenticFlowResult, FlowError> {
        let instruction = configuration
            .get_str("abstraction_prompt")
            .unwrap_or(FlowPromptTemplate::step_back_instruction());

        let principles = self
            .llm
            .generate(&FlowPromptTemplate::step_back_abstraction_prompt(instruction, prompt))
            .await?
            .text;
        let grounded_prompt = FlowPromptTemplate::step_back_grounded_prompt(prompt, &principles);
        let answer = self.llm.generate(&grounded_prompt).await?.text;

        Ok(AgenticFlowResult::builder(prompt)
            .enhanced_prompt(grounded_prompt)
            .full_response(answer.clone())
            .final_response(answer.clone())
            .reasoning(principles.clone())
            .step(ProcessingStep::new(STEP_ABSTRACTION, principles))
            .step(ProcessingStep::new(STEP_GROUNDED_RESPONSE, answer))
            .metric(METRIC_VISUALIZATION_TYPE, "step_back_prompting")
            .response_changed(true)
            .build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flows::test_support::{ScriptedLlm, context, services};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_principles_feed_grounded_answer() {
        let llm = Arc::new(ScriptedLlm::texts(&["Supply and demand.", "Prices rise."]));
        let result = StepBackProcessor::new(&services(llm.clone()))
            .process("Will rent control work?", &AgenticFlowConfiguration::new(), &context())
            .await;

        assert_eq!(result.step_types(), vec![STEP_ABSTRACTION, STEP_GROUNDED_RESPONSE]);
        assert_eq!(result.reasoning(), "Supply and demand.");
        assert_eq!(result.final_response(), "Prices rise.");
        assert!(llm.prompts()[1].contains("Supply and demand."));
    }

    #[tokio::test]
    async fn test_abstraction_override() {
        let llm = Arc::new(ScriptedLlm::texts(&["p", "a"]));
        let configuration =
            AgenticFlowConfiguration::new().with_parameter("abstraction_prompt", "Name the laws.");
        StepBackProcessor::new(&services(llm.clone()))
            .process("Q", &configuration, &context())
            .await;
        assert!(llm.prompts()[0].starts_with("Name the laws."));
    }
}
