//! Flow result value objects.
//!
//! - [`ProcessingStep`] - one typed stage of a flow's execution
//! - [`FlowStatus`] - terminal status of a processor invocation
//! - [`AgenticFlowResult`] - everything a processor hands back to the caller
//!
//! Results are assembled through [`AgenticFlowResultBuilder`], which only
//! appends steps, so `processing_steps` always reflects execution order.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Metric key set on every failed result
pub const METRIC_ERROR: &str = "error";
/// Metric key naming the front-end visualization for a flow
pub const METRIC_VISUALIZATION_TYPE: &str = "visualization_type";

/// One discrete, typed stage of a flow's execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingStep {
    /// Stage tag, e.g. `"initial_retrieval"`
    pub step_type: String,
    /// Free-form content produced by the stage
    pub content: String,
    /// Stage metadata, e.g. `persona: "architect"`
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
}

impl ProcessingStep {
    pub fn new(step_type: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            step_type: step_type.into(),
            content: content.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Terminal status of a processor invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowStatus {
    #[default]
    Success,
    Failed,
    Partial,
}

impl FlowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowStatus::Success => "SUCCESS",
            FlowStatus::Failed => "FAILED",
            FlowStatus::Partial => "PARTIAL",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FlowStatus::Success)
    }
}

impl fmt::Display for FlowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of applying one agentic flow to one prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgenticFlowResult {
    original_prompt: String,
    enhanced_prompt: String,
    full_response: String,
    final_response: String,
    reasoning: String,
    processing_steps: Vec<ProcessingStep>,
    metrics: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    confidence: Option<f64>,
    status: FlowStatus,
    response_changed: bool,
}

impl AgenticFlowResult {
    pub fn builder(original_prompt: impl Into<String>) -> AgenticFlowResultBuilder {
        AgenticFlowResultBuilder::new(original_prompt)
    }

    /// The FAILED shape: diagnostic text, `metrics.error = true`, no change.
    pub fn failure(
        original_prompt: impl Into<String>,
        final_response: impl Into<String>,
        reasoning: impl Into<String>,
    ) -> Self {
        let final_response = final_response.into();
        Self::builder(original_prompt)
            .full_response(final_response.clone())
            .final_response(final_response)
            .reasoning(reasoning)
            .metric(METRIC_ERROR, true)
            .status(FlowStatus::Failed)
            .response_changed(false)
            .build()
    }

    pub fn original_prompt(&self) -> &str {
        &self.original_prompt
    }

    pub fn enhanced_prompt(&self) -> &str {
        &self.enhanced_prompt
    }

    pub fn full_response(&self) -> &str {
        &self.full_response
    }

    pub fn final_response(&self) -> &str {
        &self.final_response
    }

    pub fn reasoning(&self) -> &str {
        &self.reasoning
    }

    pub fn processing_steps(&self) -> &[ProcessingStep] {
        &self.processing_steps
    }

    pub fn metrics(&self) -> &BTreeMap<String, Value> {
        &self.metrics
    }

    pub fn metric(&self, key: &str) -> Option<&Value> {
        self.metrics.get(key)
    }

    pub fn confidence(&self) -> Option<f64> {
        self.confidence
    }

    pub fn status(&self) -> FlowStatus {
        self.status
    }

    pub fn response_changed(&self) -> bool {
        self.response_changed
    }

    pub fn is_error(&self) -> bool {
        self.metrics
            .get(METRIC_ERROR)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Step types in execution order
    pub fn step_types(&self) -> Vec<&str> {
        self.processing_steps
            .iter()
            .map(|s| s.step_type.as_str())
            .collect()
    }
}

/// Builder for [`AgenticFlowResult`]
#[derive(Debug, Clone)]
pub struct AgenticFlowResultBuilder {
    result: AgenticFlowResult,
}

impl AgenticFlowResultBuilder {
    fn new(original_prompt: impl Into<String>) -> Self {
        let original_prompt = original_prompt.into();
        Self {
            result: AgenticFlowResult {
                enhanced_prompt: original_prompt.clone(),
                original_prompt,
                full_response: String::new(),
                final_response: String::new(),
                reasoning: String::new(),
                processing_steps: Vec::new(),
                metrics: BTreeMap::new(),
                confidence: None,
                status: FlowStatus::Success,
                response_changed: false,
            },
        }
    }

    pub fn enhanced_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.result.enhanced_prompt = prompt.into();
        self
    }

    pub fn full_response(mut self, text: impl Into<String>) -> Self {
        self.result.full_response = text.into();
        self
    }

    pub fn final_response(mut self, text: impl Into<String>) -> Self {
        self.result.final_response = text.into();
        self
    }

    pub fn reasoning(mut self, text: impl Into<String>) -> Self {
        self.result.reasoning = text.into();
        self
    }

    pub fn step(mut self, step: ProcessingStep) -> Self {
        self.result.processing_steps.push(step);
        self
    }

    pub fn steps(mut self, steps: impl IntoIterator<Item = ProcessingStep>) -> Self {
        self.result.processing_steps.extend(steps);
        self
    }

    pub fn metric(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.result.metrics.insert(key.into(), value.into());
        self
    }

    /// Confidence is clamped to `[0, 100]`; non-finite values are dropped.
    pub fn confidence(mut self, confidence: Option<f64>) -> Self {
        self.result.confidence = confidence
            .filter(|c| c.is_finite())
            .map(|c| c.clamp(0.0, 100.0));
        self
    }

    pub fn status(mut self, status: FlowStatus) -> Self {
        self.result.status = status;
        self
    }

    pub fn response_changed(mut self, changed: bool) -> Self {
        self.result.response_changed = changed;
        self
    }

    pub fn build(self) -> AgenticFlowResult {
        self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_preserves_step_order() {
        let result = AgenticFlowResult::builder("prompt")
            .step(ProcessingStep::new("first", "a"))
            .step(ProcessingStep::new("second", "b"))
            .steps([ProcessingStep::new("third", "c")])
            .build();

        assert_eq!(result.step_types(), vec!["first", "second", "third"]);
        assert_eq!(result.enhanced_prompt(), "prompt");
        assert_eq!(result.status(), FlowStatus::Success);
    }

    #[test]
    fn test_failure_shape() {
        let result = AgenticFlowResult::failure("q", "Something broke", "processing failure");
        assert_eq!(result.status(), FlowStatus::Failed);
        assert!(result.is_error());
        assert!(!result.response_changed());
        assert_eq!(result.final_response(), "Something broke");
        assert_eq!(result.reasoning(), "processing failure");
        assert!(result.processing_steps().is_empty());
    }

    #[test]
    fn test_confidence_is_clamped() {
        let high = AgenticFlowResult::builder("q").confidence(Some(140.0)).build();
        assert_eq!(high.confidence(), Some(100.0));

        let nan = AgenticFlowResult::builder("q").confidence(Some(f64::NAN)).build();
        assert_eq!(nan.confidence(), None);
    }

    #[test]
    fn test_status_serializes_screaming_case() {
        assert_eq!(
            serde_json::to_string(&FlowStatus::Partial).unwrap(),
            "\"PARTIAL\""
        );
    }
}
