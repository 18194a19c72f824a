//! Confidence Scoring: self-reported confidence, with one improvement pass
//! when the score falls below the threshold.

use crate::flows::processor::{FlowError, FlowProcessor};
use crate::flows::services::{BoundedLlm, FlowServices};
use async_trait::async_trait;
use flow_domain::flow::parsing::{parse_confidence, strip_confidence_lines};
use flow_domain::flow::result::METRIC_VISUALIZATION_TYPE;
use flow_domain::{
    AgenticFlowConfiguration, AgenticFlowResult, AgenticFlowType, FlowPromptTemplate,
    ProcessingStep, PromptContext,
};
use serde_json::Value;

pub const STEP_INITIAL_RESPONSE: &str = "initial_response";
pub const STEP_CONFIDENCE_IMPROVEMENT: &str = "confidence_improvement";

const DEFAULT_THRESHOLD: f64 = 70.0;

pub struct ConfidenceScoringProcessor {
    llm: BoundedLlm,
}

impl ConfidenceScoringProcessor {
    pub fn new(services: &FlowServices) -> Self {
        Self {
            llm: services.bounded_llm(),
        }
    }
}

fn confidence_value(confidence: Option<f64>) -> Value {
    confidence.map_or(Value::Null, Value::from)
}

#[async_trait]
impl FlowProcessor for ConfidenceScoringProcessor {
    fn flow_type(&self) -> AgenticFlowType {
        AgenticFlowType::ConfidenceScoring
    }

    fn validate_configuration(&self, configuration: &AgenticFlowConfiguration) -> bool {
        configuration.is_optional_number_in("confidence_threshold", 0.0, 100.0)
            && configuration.is_optional_bool("improve_below_threshold")
    }

    async fn execute(
        &self,
        prompt: &str,
        configuration: &AgenticFlowConfiguration,
        _context: &PromptContext,
    ) -> Result<AgenticFlowResult, FlowError> {
        let threshold = configuration
            .get_f64("confidence_threshold")
            .unwrap_or(DEFAULT_THRESHOLD);
        let improve = configuration
            .get_bool("improve_below_threshold")
            .unwrap_or(true);

        let enhanced_prompt = FlowPromptTemplate::confidence_prompt(prompt);
        let raw = self.llm.generate(&enhanced_prompt).await?.text;
        let initial_confidence = parse_confidence(&raw);
        let initial_answer = strip_confidence_lines(&raw);

        let mut builder = AgenticFlowResult::builder(prompt)
            .enhanced_prompt(enhanced_prompt)
            .step(
                ProcessingStep::new(STEP_INITIAL_RESPONSE, raw.clone())
                    .with_metadata("confidence", confidence_value(initial_confidence)),
            );

        let (full, answer, confidence, improved) = match initial_confidence {
            Some(score) if score < threshold && improve => {
                let improved_raw = self
                    .llm
                    .generate(&FlowPromptTemplate::confidence_improvement_prompt(
                        prompt,
                        &initial_answer,
                        score,
                    ))
                    .await?
                    .text;
                let improved_confidence = parse_confidence(&improved_raw);
                builder = builder.step(
                    ProcessingStep::new(STEP_CONFIDENCE_IMPROVEMENT, improved_raw.clone())
                        .with_metadata("previous_confidence", score)
                        .with_metadata("confidence", confidence_value(improved_confidence)),
                );
                let answer = strip_confidence_lines(&improved_raw);
                (improved_raw, answer, improved_confidence, true)
            }
            _ => (raw, initial_answer, initial_confidence, false),
        };

        let reasoning = match (initial_confidence, improved) {
            (Some(score), true) => format!(
                "Initial confidence {:.0} was below the threshold of {:.0}; the answer was strengthened.",
                score, threshold
            ),
            (Some(score), false) => format!("Self-reported confidence {:.0}.", score),
            (None, _) => "No confidence score could be parsed.".to_string(),
        };

        Ok(builder
            .full_response(full)
            .final_response(answer)
            .reasoning(reasoning)
            .confidence(confidence)
            .metric("confidence_score", confidence_value(confidence))
            .metric("confidence_threshold", threshold)
            .metric("improved", improved)
            .metric(METRIC_VISUALIZATION_TYPE, "confidence_scoring")
            .response_changed(improved)
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
    async fn test_high_confidence_single_step() {
        let llm = Arc::new(ScriptedLlm::texts(&["The answer is 42.\nConfidence: 90"]));
        let result = ConfidenceScoringProcessor::new(&services(llm))
            .process("Q", &AgenticFlowConfiguration::new(), &context())
            .await;

        assert_eq!(result.step_types(), vec![STEP_INITIAL_RESPONSE]);
        assert_eq!(result.confidence(), Some(90.0));
        assert_eq!(result.final_response(), "The answer is 42.");
        assert_eq!(result.metric("improved"), Some(&json!(false)));
        assert!(!result.response_changed());
    }

    #[tokio::test]
    async fn test_low_confidence_triggers_improvement() {
        let llm = Arc::new(ScriptedLlm::texts(&[
            "Maybe 41.\nConfidence: 40",
            "It is 42, per the source.\nConfidence: 85",
        ]));
        let result = ConfidenceScoringProcessor::new(&services(llm.clone()))
            .process("Q", &AgenticFlowConfiguration::new(), &context())
            .await;

        assert_eq!(
            result.step_types(),
            vec![STEP_INITIAL_RESPONSE, STEP_CONFIDENCE_IMPROVEMENT]
        );
        assert_eq!(result.confidence(), Some(85.0));
        assert_eq!(result.final_response(), "It is 42, per the source.");
        assert!(result.response_changed());
        assert!(llm.prompts()[1].contains("40/100"));
    }

    #[tokio::test]
    async fn test_improvement_disabled() {
        let llm = Arc::new(ScriptedLlm::texts(&["Maybe.\nConfidence: 10"]));
        let configuration = AgenticFlowConfiguration::new()
            .with_parameter("improve_below_threshold", false);
        let result = ConfidenceScoringProcessor::new(&services(llm.clone()))
            .process("Q", &configuration, &context())
            .await;

        assert_eq!(llm.call_count(), 1);
        assert_eq!(result.confidence(), Some(10.0));
    }

    #[tokio::test]
    async fn test_unparseable_confidence() {
        let llm = Arc::new(ScriptedLlm::texts(&["No score here."]));
        let result = ConfidenceScoringProcessor::new(&services(llm.clone()))
            .process("Q", &AgenticFlowConfiguration::new(), &context())
            .await;

        assert_eq!(result.confidence(), None);
        assert_eq!(result.metric("confidence_score"), Some(&Value::Null));
        assert_eq!(llm.call_count(), 1);
        assert!(!result.is_error());
    }

    #[test]
    fn test_validate_configuration() {
        let processor =
            ConfidenceScoringProcessor::new(&services(Arc::new(ScriptedLlm::texts(&[]))));
        assert!(processor.validate_configuration(&AgenticFlowConfiguration::new()));
        assert!(processor.validate_configuration(
            &AgenticFlowConfiguration::new().with_parameter("confidence_threshold", 55.5)
        ));
        assert!(!processor.validate_configuration(
            &AgenticFlowConfiguration::new().with_parameter("confidence_threshold", 150)
        ));
        assert!(!processor.validate_configuration(
            &AgenticFlowConfiguration::new().with_parameter("improve_below_threshold", "yes")
        ));
    }
}
