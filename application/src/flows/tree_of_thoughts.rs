//! Tree of Thoughts: branch into approaches, pick the most promising one,
//! expand it into the answer.

use crate::flows::processor::{FlowError, FlowProcessor};
use crate::flows::services::{BoundedLlm, FlowServices};
use async_trait::async_trait;
use flow_domain::flow::parsing::{first_valid_index, parse_numbered_items};
use flow_domain::flow::result::METRIC_VISUALIZATION_TYPE;
use flow_domain::{
    AgenticFlowConfiguration, AgenticFlowResult, AgenticFlowType, FlowPromptTemplate,
    ProcessingStep, PromptContext,
};

pub const STEP_THOUGHT_GENERATION: &str = "thought_generation";
pub const STEP_THOUGHT_EVALUATION: &str = "thought_evaluation";
pub const STEP_SOLUTION_EXPANSION: &str = "solution_expansion";

const DEFAULT_BRANCH_COUNT: u64 = 3;

pub struct TreeOfThoughtsProcessor {
    llm: BoundedLlm,
}

impl TreeOfThoughtsProcessor {
    pub fn new(services: &FlowServices) -> Self {
        Self {
            llm: services.bounded_llm(),
        }
    }
}

#[async_trait]
impl FlowProcessor for TreeOfThoughtsProcessor {
    fn flow_type(&self) -> AgenticFlowType {
        AgenticFlowType::TreeOfThoughts
    }

    fn validate_configuration(&self, configuration: &AgenticFlowConfiguration) -> bool {
        configuration.is_optional_integer_in("branch_count", 2, 5)
    }

    async fn execute(
        &self,
        prompt: &str,
        configuration: &AgenticFlowConfiguration,
        _context: &PromptContext,
    ) -> Result<AgenticFlowResult, FlowError> {
        let branch_count = configuration
            .get_u64("branch_count")
            .unwrap_or(DEFAULT_BRANCH_COUNT) as usize;

        let generation = self
            .llm
            .generate(&FlowPromptTemplate::thought_generation_prompt(prompt, branch_count))
            .await?
            .text;
        let branches = parse_numbered_items(&generation, branch_count);
        if branches.is_empty() {
            return Err(FlowError::MalformedResponse(
                "no approaches were generated".to_string(),
            ));
        }

        let evaluation = self
            .llm
            .generate(&FlowPromptTemplate::thought_evaluation_prompt(prompt, &branches))
            .await?
            .text;
        let selected = first_valid_index(&evaluation, branches.len()).unwrap_or(0);

        let expansion_prompt =
            FlowPromptTemplate::solution_expansion_prompt(prompt, &branches[selected]);
        let solution = self.llm.generate(&expansion_prompt).await?.text;

        Ok(AgenticFlowResult::builder(prompt)
            .enhanced_prompt(expansion_prompt)
            .full_response(solution.clone())
            .final_response(solution.clone())
            .reasoning(evaluation.clone())
            .step(
                ProcessingStep::new(STEP_THOUGHT_GENERATION, generation)
                    .with_metadata("branches", branches.clone()),
            )
            .step(
                ProcessingStep::new(STEP_THOUGHT_EVALUATION, evaluation)
                    .with_metadata("selected_branch", selected + 1),
            )
            .step(ProcessingStep::new(STEP_SOLUTION_EXPANSION, solution))
            .metric("branch_count", branch_count)
            .metric("branches_generated", branches.len())
            .metric("selected_branch", selected + 1)
            .metric(METRIC_VISUALIZATION_TYPE, "tree_of_thoughts")
            .response_changed(true)
            .build())
    }
}
