//! Constitutional Prompting: check an answer against principles and rewrite
//! it only when violations are reported.

use crate::flows::processor::{FlowError, FlowProcessor};
use crate::flows::services::{BoundedLlm, FlowServices};
use async_trait::async_trait;
use flow_domain::flow::result::METRIC_VISUALIZATION_TYPE;
use flow_domain::{
    AgenticFlowConfiguration, AgenticFlowResult, AgenticFlowType, FlowPromptTemplate,
    ProcessingStep, PromptContext,
};

pub const STEP_INITIAL_RESPONSE: &str = "initial_response";
pub const STEP_CONSTITUTIONAL_CRITIQUE: &str = "constitutional_critique";
pub const STEP_CONSTITUTIONAL_REVISION: &str = "constitutional_revision";

const NO_VIOLATIONS: &str = "NO VIOLATIONS";

pub struct ConstitutionalProcessor {
    llm: BoundedLlm,
}

impl ConstitutionalProcessor {
    pub fn new(services: &FlowServices) -> Self {
        Self {
            llm: services.bounded_llm(),
        }
    }
}

#[async_trait]
impl FlowProcessor for ConstitutionalProcessor {
    fn flow_type(&self) -> AgenticFlowType {
        AgenticFlowType::ConstitutionalPrompting
    }

    fn validate_configuration(&self, configuration: &AgenticFlowConfiguration) -> bool {
        configuration.is_optional_string_list("principles")
    }

    async fn execute(
        &self,
        prompt: &str,
        configuration: &AgenticFlowConfiguration,
        _context: &PromptContext,
    ) -> Result<AgenticFlowResult, FlowError> {
        let principles = configuration
            .get_str_list("principles")
            .filter(|p| !p.is_empty())
            .unwrap_or_else(FlowPromptTemplate::default_principles);

        let initial = self.llm.generate(prompt).await?.text;
        let critique = self
            .llm
            .generate(&FlowPromptTemplate::constitutional_critique_prompt(
                prompt,
                &initial,
                &principles,
            ))
            .await?
            .text;
        let violations_found = !critique.to_uppercase().contains(NO_VIOLATIONS);

        let builder = AgenticFlowResult::builder(prompt)
            .reasoning(critique.clone())
            .step(ProcessingStep::new(STEP_INITIAL_RESPONSE, initial.clone()))
            .step(
                ProcessingStep::new(STEP_CONSTITUTIONAL_CRITIQUE, critique.clone())
                    .with_metadata("violations_found", violations_found),
            )
            .metric("principles_count", principles.len())
            .metric("violations_found", violations_found)
            .metric(METRIC_VISUALIZATION_TYPE, "constitutional_prompting");

        if !violations_found {
            return Ok(builder
                .full_response(initial.clone())
                .final_response(initial)
                .response_changed(false)
                .build());
        }

        let revision_prompt = FlowPromptTemplate::constitutional_revision_prompt(
            prompt,
            &initial,
            &critique,
            &principles,
        );
        let revised = self.llm.generate(&revision_prompt).await?.text;

        Ok(builder
            .enhanced_prompt(revision_prompt)
            .full_response(revised.clone())
            .final_response(revised.clone())
            .step(ProcessingStep::new(STEP_CONSTITUTIONAL_REVISION, revised))
            .response_changed(true)
            .build())
    }
}
