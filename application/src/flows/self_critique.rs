//! Self-Critique Loop: answer, then critique and revise a fixed number of times.

use crate::flows::processor::{FlowError, FlowProcessor};
use crate::flows::services::{BoundedLlm, FlowServices};
use async_trait::async_trait;
use flow_domain::flow::result::METRIC_VISUALIZATION_TYPE;
use flow_domain::{
    AgenticFlowConfiguration, AgenticFlowResult, AgenticFlowType, FlowPromptTemplate,
    ProcessingStep, PromptContext,
};

pub const STEP_INITIAL_RESPONSE: &str = "initial_response";
pub const STEP_CRITIQUE: &str = "critique";
pub const STEP_REVISION: &str = "revision";

const DEFAULT_ITERATIONS: u64 = 2;
const MAX_ITERATIONS: u64 = 5;

pub struct SelfCritiqueProcessor {
    llm: BoundedLlm,
}

impl SelfCritiqueProcessor {
    pub fn new(services: &FlowServices) -> Self {
        Self {
            llm: services.bounded_llm(),
        }
    }
}

#[async_trait]
impl FlowProcessor for SelfCritiqueProcessor {
    fn flow_type(&self) -> AgenticFlowType {
        AgenticFlowType::SelfCritiqueLoop
    }

    fn validate_configuration(&self, configuration: &AgenticFlowConfiguration) -> bool {
        configuration.is_optional_integer_in("iterations", 1, MAX_ITERATIONS)
    }

    async fn execute(
        &self,
        prompt: &str,
        configuration: &AgenticFlowConfiguration,
        _context: &PromptContext,
    ) -> Result<AgenticFlowResult, FlowError> {
        let iterations = configuration
            .get_u64("iterations")
            .unwrap_or(DEFAULT_ITERATIONS);

        let initial = self.llm.generate(prompt).await?.text;
        let mut steps = vec![ProcessingStep::new(STEP_INITIAL_RESPONSE, initial.clone())];
        let mut current = initial.clone();
        let mut critiques = Vec::new();

        for iteration in 1..=iterations {
            let critique = self
                .llm
                .generate(&FlowPromptTemplate::critique_prompt(prompt, &current))
                .await?
                .text;
            steps.push(
                ProcessingStep::new(STEP_CRITIQUE, critique.clone())
                    .with_metadata("iteration", iteration),
            );

            current = self
                .llm
                .generate(&FlowPromptTemplate::revision_prompt(prompt, &current, &critique))
                .await?
                .text;
            steps.push(
                ProcessingStep::new(STEP_REVISION, current.clone())
                    .with_metadata("iteration", iteration),
            );
            critiques.push(format!("Critique {}:\n{}", iteration, critique));
        }

        let changed = current.trim() != initial.trim();

        Ok(AgenticFlowResult::builder(prompt)
            .full_response(current.clone())
            .final_response(current)
            .reasoning(critiques.join("\n\n"))
            .steps(steps)
            .metric("iterations", iterations)
            .metric(METRIC_VISUALIZATION_TYPE, "self_critique_loop")
            .response_changed(changed)
            .build())
    }
}
