//! Post-Processing Rules: one model call followed by deterministic rules.

use crate::flows::processor::{FlowError, FlowProcessor};
use crate::flows::services::{BoundedLlm, FlowServices};
use async_trait::async_trait;
use flow_domain::flow::result::METRIC_VISUALIZATION_TYPE;
use flow_domain::{
    AgenticFlowConfiguration, AgenticFlowResult, AgenticFlowType, PostProcessingRules,
    ProcessingStep, PromptContext,
};

pub const STEP_INITIAL_RESPONSE: &str = "initial_response";
pub const STEP_POST_PROCESSING: &str = "post_processing";

const MAX_LENGTH_LIMIT: u64 = 100_000;

pub struct PostProcessingProcessor {
    llm: BoundedLlm,
}

impl PostProcessingProcessor {
    pub fn new(services: &FlowServices) -> Self {
        Self {
            llm: services.bounded_llm(),
        }
    }
}

fn rules_from(configuration: &AgenticFlowConfiguration) -> PostProcessingRules {
    PostProcessingRules {
        strip_markdown: configuration.get_bool("strip_markdown").unwrap_or(false),
        forbidden_phrases: configuration
            .get_str_list("forbidden_phrases")
            .unwrap_or_default(),
        max_length: configuration.get_u64("max_length").map(|n| n as usize),
        required_disclaimer: configuration
            .get_str("required_disclaimer")
            .map(str::to_string),
    }
}

#[async_trait]
impl FlowProcessor for PostProcessingProcessor {
    fn flow_type(&self) -> AgenticFlowType {
        AgenticFlowType::PostProcessingRules
    }

    fn validate_configuration(&self, configuration: &AgenticFlowConfiguration) -> bool {
        configuration.is_optional_integer_in("max_length", 1, MAX_LENGTH_LIMIT)
            && configuration.is_optional_string_list("forbidden_phrases")
            && configuration.is_optional_string("required_disclaimer")
            && configuration.is_optional_bool("strip_markdown")
    }

    async fn execute(
        &self,
        prompt: &str,
        configuration: &AgenticFlowConfiguration,
        _context: &PromptContext,
    ) -> Result<AgenticFlowResult, FlowError> {
        let raw = self.llm.generate(prompt).await?.text;
        let processed = rules_from(configuration).apply(&raw);
        let changed = processed.text != raw;

        Ok(AgenticFlowResult::builder(prompt)
            .full_response(raw.clone())
            .final_response(processed.text.clone())
            .reasoning(if processed.rules_applied.is_empty() {
                "No post-processing rule changed the answer.".to_string()
            } else {
                format!("Applied rules: {}", processed.rules_applied.join(", "))
            })
            .step(ProcessingStep::new(STEP_INITIAL_RESPONSE, raw))
            .step(
                ProcessingStep::new(STEP_POST_PROCESSING, processed.text)
                    .with_metadata("rules_applied", processed.rules_applied.clone()),
            )
            .metric("rules_applied", processed.rules_applied.len())
            .metric(METRIC_VISUALIZATION_TYPE, "post_processing_rules")
            .response_changed(changed)
            .build())
    }
}
