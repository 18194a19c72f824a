//! Read-only descriptors consumed by the recommendation service.

use crate::flow::flow_type::AgenticFlowType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How demanding the debate topic is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    #[default]
    Medium,
    High,
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Complexity::Low => write!(f, "low"),
            Complexity::Medium => write!(f, "medium"),
            Complexity::High => write!(f, "high"),
        }
    }
}

impl std::str::FromStr for Complexity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" | "l" => Ok(Complexity::Low),
            "medium" | "med" | "m" => Ok(Complexity::Medium),
            "high" | "h" => Ok(Complexity::High),
            _ => Err(format!("Invalid Complexity: {}", s)),
        }
    }
}

/// Characteristics of the debate a recommendation is made for
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebateContext {
    pub debate_id: String,
    pub topic: String,
    pub complexity: Complexity,
    /// Claims must be backed by sources or verified facts
    pub requires_fact_checking: bool,
    /// Ethically or emotionally sensitive subject matter
    pub sensitive_topic: bool,
    /// Participants argue against each other rather than collaborate
    pub adversarial_format: bool,
    /// Outcome matters enough to trade latency for reliability
    pub high_stakes: bool,
}

impl DebateContext {
    pub fn new(debate_id: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            debate_id: debate_id.into(),
            topic: topic.into(),
            ..Default::default()
        }
    }

    pub fn with_complexity(mut self, complexity: Complexity) -> Self {
        self.complexity = complexity;
        self
    }

    pub fn with_fact_checking(mut self, required: bool) -> Self {
        self.requires_fact_checking = required;
        self
    }

    pub fn with_sensitive_topic(mut self, sensitive: bool) -> Self {
        self.sensitive_topic = sensitive;
        self
    }

    pub fn with_adversarial_format(mut self, adversarial: bool) -> Self {
        self.adversarial_format = adversarial;
        self
    }

    pub fn with_high_stakes(mut self, high_stakes: bool) -> Self {
        self.high_stakes = high_stakes;
        self
    }
}

/// The participant a recommendation is made for
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticipantContext {
    pub participant_id: String,
    pub role: Option<String>,
    pub preferred_flow_types: Vec<AgenticFlowType>,
}

impl ParticipantContext {
    pub fn new(participant_id: impl Into<String>) -> Self {
        Self {
            participant_id: participant_id.into(),
            ..Default::default()
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_preferred(mut self, flow_type: AgenticFlowType) -> Self {
        if !self.preferred_flow_types.contains(&flow_type) {
            self.preferred_flow_types.push(flow_type);
        }
        self
    }

    pub fn prefers(&self, flow_type: AgenticFlowType) -> bool {
        self.preferred_flow_types.contains(&flow_type)
    }
}

/// Live performance of the flow a participant is currently using
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceContext {
    /// Average confidence in `[0, 100]`
    pub average_confidence: f64,
    /// Share of turns where the flow changed the naive answer
    pub response_change_rate: f64,
    pub average_execution_time_ms: f64,
    /// Share of failed invocations
    #[serde(default)]
    pub error_rate: f64,
}

impl PerformanceContext {
    pub fn new(
        average_confidence: f64,
        response_change_rate: f64,
        average_execution_time_ms: f64,
    ) -> Self {
        Self {
            average_confidence,
            response_change_rate,
            average_execution_time_ms,
            error_rate: 0.0,
        }
    }

    pub fn with_error_rate(mut self, error_rate: f64) -> Self {
        self.error_rate = error_rate;
        self
    }
}
