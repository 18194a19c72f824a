//! Ensemble Voting: several candidates at spread temperatures, one vote.

use crate::flows::processor::{FlowError, FlowProcessor};
use crate::flows::services::{BoundedLlm, FlowServices};
use crate::ports::llm_service::GenerationParams;
use async_trait::async_trait;
use flow_domain::flow::parsing::first_valid_index;
use flow_domain::flow::result::METRIC_VISUALIZATION_TYPE;
use flow_domain::{
    AgenticFlowConfiguration, AgenticFlowResult, AgenticFlowType, FlowPromptTemplate, FlowStatus,
    ProcessingStep, PromptContext,
};
use tracing::warn;

pub const STEP_ENSEMBLE_CANDIDATE: &str = "ensemble_candidate";
pub const STEP_ENSEMBLE_VOTE: &str = "ensemble_vote";

const DEFAULT_ENSEMBLE_SIZE: u64 = 3;
const MIN_ENSEMBLE_SIZE: u64 = 2;
const MAX_ENSEMBLE_SIZE: u64 = 7;
const MIN_TEMPERATURE: f64 = 0.3;
const MAX_TEMPERATURE: f64 = 1.0;

pub struct EnsembleVotingProcessor {
    llm: BoundedLlm,
}

impl EnsembleVotingProcessor {
    pub fn new(services: &FlowServices) -> Self {
        Self {
            llm: services.bounded_llm(),
        }
    }
}

/// Temperature for candidate `index` of `size`, evenly spread
fn temperature(index: usize, size: usize) -> f64 {
    if size <= 1 {
        return MIN_TEMPERATURE;
    }
    MIN_TEMPERATURE + (MAX_TEMPERATURE - MIN_TEMPERATURE) * index as f64 / (size - 1) as f64
}

#[async_trait]
impl FlowProcessor for EnsembleVotingProcessor {
    fn flow_type(&self) -> AgenticFlowType {
        AgenticFlowType::EnsembleVoting
    }

    fn validate_configuration(&self, configuration: &AgenticFlowConfiguration) -> bool {
        configuration.is_optional_integer_in("ensemble_size", MIN_ENSEMBLE_SIZE, MAX_ENSEMBLE_SIZE)
    }

    async fn execute(
        &self,
        prompt: &str,
        configuration: &AgenticFlowConfiguration,
        _context: &PromptContext,
    ) -> Result<AgenticFlowResult, FlowError> {
        let size = configuration
            .get_u64("ensemble_size")
            .unwrap_or(DEFAULT_ENSEMBLE_SIZE) as usize;

        let mut steps = Vec::new();
        // (1-based candidate number, text)
        let mut candidates: Vec<(usize, String)> = Vec::new();

        for index in 0..size {
            let temperature = temperature(index, size);
            let params = GenerationParams::default().with_temperature(temperature);
            match self.llm.generate_with(prompt, &params).await {
                Ok(response) => {
                    steps.push(
                        ProcessingStep::new(STEP_ENSEMBLE_CANDIDATE, response.text.clone())
                            .with_metadata("candidate", index + 1)
                            .with_metadata("temperature", temperature),
                    );
                    candidates.push((index + 1, response.text));
                }
                Err(error) => warn!("Ensemble candidate {} failed: {}", index + 1, error),
            }
        }

        if candidates.is_empty() {
            return Err(FlowError::AllCandidatesFailed(size));
        }

        let (selected, vote_text) = if candidates.len() == 1 {
            (0, "Only one candidate succeeded; no vote needed.".to_string())
        } else {
            let texts: Vec<String> = candidates.iter().map(|(_, t)| t.clone()).collect();
            let vote = self
                .llm
                .generate(&FlowPromptTemplate::ensemble_vote_prompt(prompt, &texts))
                .await?
                .text;
            let selected = first_valid_index(&vote, texts.len()).unwrap_or(0);
            steps.push(
                ProcessingStep::new(STEP_ENSEMBLE_VOTE, vote.clone())
                    .with_metadata("selected_candidate", candidates[selected].0),
            );
            (selected, vote)
        };

        let successful = candidates.len();
        let (selected_number, answer) = candidates.swap_remove(selected);
        let status = if successful < size {
            FlowStatus::Partial
        } else {
            FlowStatus::Success
        };

        Ok(AgenticFlowResult::builder(prompt)
            .full_response(answer.clone())
            .final_response(answer)
            .reasoning(vote_text)
            .steps(steps)
            .confidence(Some(100.0 * successful as f64 / size as f64))
            .status(status)
            .metric("ensemble_size", size)
            .metric("successful_candidates", successful)
            .metric("selected_candidate", selected_number)
            .metric(METRIC_VISUALIZATION_TYPE, "ensemble_voting")
            .response_changed(selected_number != 1)
            .build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flows::test_support::{Scripted, ScriptedLlm, context, services};
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_vote_selects_candidate() {
        let llm = Arc::new(ScriptedLlm::texts(&["a", "b", "c", "Candidate 2 is clearest."]));
        let result = EnsembleVotingProcessor::new(&services(llm.clone()))
            .process("Q", &AgenticFlowConfiguration::new(), &context())
            .await;

        assert_eq!(
            result.step_types(),
            vec![
                STEP_ENSEMBLE_CANDIDATE,
                STEP_ENSEMBLE_CANDIDATE,
                STEP_ENSEMBLE_CANDIDATE,
                STEP_ENSEMBLE_VOTE
            ]
        );
        assert_eq!(result.final_response(), "b");
        assert_eq!(result.status(), FlowStatus::Success);
        assert_eq!(result.confidence(), Some(100.0));
        assert_eq!(result.metric("selected_candidate"), Some(&json!(2)));
        assert!(result.response_changed());

        let temperatures = llm.temperatures();
        assert_eq!(temperatures[0], Some(MIN_TEMPERATURE));
        assert!((temperatures[2].unwrap() - MAX_TEMPERATURE).abs() < 1e-9);
        assert_eq!(temperatures[3], None);
    }

    #[tokio::test]
    async fn test_failed_candidate_is_partial() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            Scripted::text("a"),
            Scripted::Error("flaky".to_string()),
            Scripted::text("c"),
            Scripted::text("I pick 2"),
        ]));
        let result = EnsembleVotingProcessor::new(&services(llm))
            .process("Q", &AgenticFlowConfiguration::new(), &context())
            .await;

        assert_eq!(result.status(), FlowStatus::Partial);
        assert_eq!(result.final_response(), "c");
        assert_eq!(result.metric("successful_candidates"), Some(&json!(2)));
        assert_eq!(result.metric("selected_candidate"), Some(&json!(3)));
        assert!(!result.is_error());
    }

    #[tokio::test]
    async fn test_unparseable_vote_falls_back_to_first() {
        let llm = Arc::new(ScriptedLlm::texts(&["a", "b", "all good"]));
        let configuration = AgenticFlowConfiguration::new().with_parameter("ensemble_size", 2);
        let result = EnsembleVotingProcessor::new(&services(llm))
            .process("Q", &configuration, &context())
            .await;

        assert_eq!(result.final_response(), "a");
        assert!(!result.response_changed());
    }

    #[tokio::test]
    async fn test_all_candidates_failed() {
        let llm = Arc::new(ScriptedLlm::failing("down"));
        let result = EnsembleVotingProcessor::new(&services(llm))
            .process("Q", &AgenticFlowConfiguration::new(), &context())
            .await;

        assert!(result.is_error());
        assert_eq!(result.status(), FlowStatus::Failed);
    }

    #[test]
    fn test_validate_configuration() {
        let processor = EnsembleVotingProcessor::new(&services(Arc::new(ScriptedLlm::texts(&[]))));
        assert!(processor.validate_configuration(&AgenticFlowConfiguration::new()));
        assert!(!processor.validate_configuration(
            &AgenticFlowConfiguration::new().with_parameter("ensemble_size", 1)
        ));
        assert!(!processor.validate_configuration(
            &AgenticFlowConfiguration::new().with_parameter("ensemble_size", 8)
        ));
    }
}
