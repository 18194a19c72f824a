//! Audit records written once per processor invocation.

use crate::flow::flow_type::AgenticFlowType;
use crate::flow::result::{AgenticFlowResult, FlowStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use uuid::Uuid;

/// Append-only record of one `process()` call.
///
/// Only [`response_improvement`](Self::response_improvement) may change after
/// the record is saved, and only through the repository's
/// `update_response_improvement`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgenticFlowExecution {
    pub id: Uuid,
    pub flow_id: String,
    pub debate_id: String,
    pub organization_id: String,
    pub flow_type: AgenticFlowType,
    /// Wall-clock execution time in milliseconds
    pub execution_time_ms: u64,
    pub status: FlowStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub response_changed: bool,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_improvement: Option<ResponseImprovement>,
}

/// Post-hoc annotation of whether the flow improved the answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseImprovement {
    pub improved: bool,
    /// Optional rating in `[0, 1]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ResponseImprovement {
    pub fn new(improved: bool) -> Self {
        Self {
            improved,
            score: None,
            note: None,
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score.clamp(0.0, 1.0));
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

impl AgenticFlowExecution {
    /// Create a fresh record with a new id and the current UTC timestamp.
    pub fn new(
        flow_id: impl Into<String>,
        debate_id: impl Into<String>,
        organization_id: impl Into<String>,
        flow_type: AgenticFlowType,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            flow_id: flow_id.into(),
            debate_id: debate_id.into(),
            organization_id: organization_id.into(),
            flow_type,
            execution_time_ms: 0,
            status: FlowStatus::Success,
            confidence: None,
            response_changed: false,
            timestamp: Utc::now(),
            metadata: BTreeMap::new(),
            response_improvement: None,
        }
    }

    /// Copy status, confidence and a metadata digest from a flow result
    pub fn with_result(mut self, result: &AgenticFlowResult, execution_time: Duration) -> Self {
        self.execution_time_ms = u64::try_from(execution_time.as_millis()).unwrap_or(u64::MAX);
        self.status = result.status();
        self.confidence = result.confidence();
        self.response_changed = result.response_changed();
        self.metadata
            .insert("step_count".to_string(), result.processing_steps().len().into());
        self.metadata.insert(
            "step_types".to_string(),
            Value::from(
                result
                    .step_types()
                    .into_iter()
                    .map(Value::from)
                    .collect::<Vec<_>>(),
            ),
        );
        self.metadata.insert(
            "metrics".to_string(),
            Value::Object(result.metrics().clone().into_iter().collect()),
        );
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_status(mut self, status: FlowStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_confidence(mut self, confidence: Option<f64>) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_execution_time_ms(mut self, millis: u64) -> Self {
        self.execution_time_ms = millis;
        self
    }

    pub fn with_response_changed(mut self, changed: bool) -> Self {
        self.response_changed = changed;
        self
    }
}

/// Secondary per-execution telemetry (best effort)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowPerformanceMetrics {
    pub execution_id: Uuid,
    pub flow_type: AgenticFlowType,
    pub step_count: usize,
    #[serde(default)]
    pub metrics: BTreeMap<String, Value>,
    pub recorded_at: DateTime<Utc>,
}

impl FlowPerformanceMetrics {
    pub fn from_result(
        execution_id: Uuid,
        flow_type: AgenticFlowType,
        result: &AgenticFlowResult,
    ) -> Self {
        Self {
            execution_id,
            flow_type,
            step_count: result.processing_steps().len(),
            metrics: result.metrics().clone(),
            recorded_at: Utc::now(),
        }
    }
}
