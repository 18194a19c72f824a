//! Recommendation outputs. Ephemeral: computed per request, never persisted.

use crate::flow::flow_type::AgenticFlowType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How urgently a participant should move off their current flow type
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwitchUrgency {
    #[default]
    None,
    Low,
    Medium,
    High,
}

impl SwitchUrgency {
    /// Map accumulated severity points to an urgency level
    pub fn from_severity(points: u32) -> Self {
        match points {
            0 => SwitchUrgency::None,
            1 => SwitchUrgency::Low,
            2 => SwitchUrgency::Medium,
            _ => SwitchUrgency::High,
        }
    }

    /// Medium or above warrants a switch
    pub fn warrants_switch(&self) -> bool {
        *self >= SwitchUrgency::Medium
    }
}

impl fmt::Display for SwitchUrgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwitchUrgency::None => write!(f, "NONE"),
            SwitchUrgency::Low => write!(f, "LOW"),
            SwitchUrgency::Medium => write!(f, "MEDIUM"),
            SwitchUrgency::High => write!(f, "HIGH"),
        }
    }
}

/// Diagnosis of a live [`PerformanceContext`](super::context::PerformanceContext)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceAnalysis {
    pub has_significant_issues: bool,
    pub issues: Vec<String>,
    pub severity_points: u32,
    pub switch_urgency: SwitchUrgency,
}

/// Score breakdown for one candidate flow type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowTypeRecommendation {
    pub flow_type: AgenticFlowType,
    /// Weighted total in `[0, 1]`
    pub score: f64,
    pub context_score: f64,
    pub performance_score: f64,
    pub trend_score: f64,
    pub reasons: Vec<String>,
}

/// Ranked, explainable flow suggestions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRecommendation {
    recommendations: Vec<FlowTypeRecommendation>,
    generated_at: DateTime<Utc>,
}

impl FlowRecommendation {
    /// Sorts by score descending; ties keep flow-type order.
    pub fn new(mut recommendations: Vec<FlowTypeRecommendation>) -> Self {
        recommendations.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then(a.flow_type.cmp(&b.flow_type))
        });
        Self {
            recommendations,
            generated_at: Utc::now(),
        }
    }

    pub fn recommendations(&self) -> &[FlowTypeRecommendation] {
        &self.recommendations
    }

    pub fn primary(&self) -> Option<&FlowTypeRecommendation> {
        self.recommendations.first()
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    /// Best recommendation other than `flow_type`
    pub fn best_excluding(&self, flow_type: AgenticFlowType) -> Option<&FlowTypeRecommendation> {
        self.recommendations
            .iter()
            .find(|r| r.flow_type != flow_type)
    }
}

/// Whether (and to what) a participant should switch flows mid-debate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveFlowRecommendation {
    pub current_flow_type: AgenticFlowType,
    pub should_switch: bool,
    pub switch_urgency: SwitchUrgency,
    pub analysis: PerformanceAnalysis,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_flow_type: Option<AgenticFlowType>,
    pub alternatives: Vec<FlowTypeRecommendation>,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(flow_type: AgenticFlowType, score: f64) -> FlowTypeRecommendation {
        FlowTypeRecommendation {
            flow_type,
            score,
            context_score: 0.0,
            performance_score: 0.0,
            trend_score: 0.0,
            reasons: vec![],
        }
    }

    #[test]
    fn test_recommendations_sorted_descending() {
        let recommendation = FlowRecommendation::new(vec![
            rec(AgenticFlowType::InternalMonologue, 0.2),
            rec(AgenticFlowType::TreeOfThoughts, 0.9),
            rec(AgenticFlowType::EnsembleVoting, 0.5),
        ]);
        let scores: Vec<f64> = recommendation
            .recommendations()
            .iter()
            .map(|r| r.score)
            .collect();
        assert_eq!(scores, vec![0.9, 0.5, 0.2]);
        assert_eq!(
            recommendation.primary().unwrap().flow_type,
            AgenticFlowType::TreeOfThoughts
        );
        assert_eq!(
            recommendation
                .best_excluding(AgenticFlowType::TreeOfThoughts)
                .unwrap()
                .flow_type,
            AgenticFlowType::EnsembleVoting
        );
    }

    #[test]
    fn test_urgency_ordering() {
        assert!(SwitchUrgency::High > SwitchUrgency::Medium);
        assert!(SwitchUrgency::Medium.warrants_switch());
        assert!(!SwitchUrgency::Low.warrants_switch());
        assert_eq!(SwitchUrgency::from_severity(7), SwitchUrgency::High);
    }
}
