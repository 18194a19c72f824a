//! Prompt Chaining: a fixed sequence of instructions, each fed the previous
//! output.

use crate::flows::processor::{FlowError, FlowProcessor};
use crate::flows::services::{BoundedLlm, FlowServices};
use async_trait::async_trait;
use flow_domain::flow::result::METRIC_VISUALIZATION_TYPE;
use flow_domain::{
    AgenticFlowConfiguration, AgenticFlowResult, AgenticFlowType, FlowPromptTemplate,
    ProcessingStep, PromptContext,
};

pub const STEP_CHAIN_STEP: &str = "chain_step";

const MAX_CHAIN_LENGTH: usize = 10;

pub struct PromptChainingProcessor {
    llm: BoundedLlm,
}

impl PromptChainingProcessor {
    pub fn new(services: &FlowServices) -> Self {
        Self {
            llm: services.bounded_llm(),
        }
    }
}

#[async_trait]
impl FlowProcessor for PromptChainingProcessor {
    fn flow_type(&self) -> AgenticFlowType {
        AgenticFlowType::PromptChaining
    }

    fn validate_configuration(&self, configuration: &AgenticFlowConfiguration) -> bool {
        configuration.is_optional_string_list("chain")
            && configuration
                .get("chain")
                .and_then(|v| v.as_array())
                .is_none_or(|chain| (1..=MAX_CHAIN_LENGTH).contains(&chain.len()))
    }

    async fn execute(
        &self,
        prompt: &str,
        configuration: &AgenticFlowConfiguration,
        _context: &PromptContext,
    ) -> Result<AgenticFlowResult, FlowError> {
        let chain = configuration
            .get_str_list("chain")
            .unwrap_or_else(FlowPromptTemplate::default_chain);

        let mut steps = Vec::with_capacity(chain.len());
        let mut outputs: Vec<String> = Vec::with_capacity(chain.len());
        let mut last_prompt = prompt.to_string();

        for (index, instruction) in chain.iter().enumerate() {
            last_prompt = FlowPromptTemplate::chain_step_prompt(
                prompt,
                instruction,
                outputs.last().map(String::as_str),
            );
            let output = self.llm.generate(&last_prompt).await?.text;
            steps.push(
                ProcessingStep::new(STEP_CHAIN_STEP, output.clone())
                    .with_metadata("index", index + 1)
                    .with_metadata("instruction", instruction.clone()),
            );
            outputs.push(output);
        }

        let final_output = outputs.last().cloned().unwrap_or_default();
        let intermediate = outputs[..outputs.len().saturating_sub(1)].join("\n\n---\n\n");

        Ok(AgenticFlowResult::builder(prompt)
            .enhanced_prompt(last_prompt)
            .full_response(final_output.clone())
            .final_response(final_output)
            .reasoning(intermediate)
            .steps(steps)
            .metric("chain_length", chain.len())
            .metric(METRIC_VISUALIZATION_TYPE, "prompt_chaining")
            .response_changed(chain.len() > 1)
            .build())
    }
}
