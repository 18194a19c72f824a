//! Pure scoring rules behind flow recommendations.
//!
//! A candidate's score combines three signals, each in `[0, 1]`:
//!
//! | Signal | Source |
//! |--------|--------|
//! | context | affinity of the flow type to the debate/participant |
//! | performance | historical success rate and confidence |
//! | trend | normalized trend score over the trailing window |

use crate::analytics::aggregate::FlowTypeAnalytics;
use crate::flow::flow_type::AgenticFlowType;
use crate::recommendation::context::{
    Complexity, DebateContext, ParticipantContext, PerformanceContext,
};
use crate::recommendation::value_objects::{
    FlowTypeRecommendation, PerformanceAnalysis, SwitchUrgency,
};
use serde::{Deserialize, Serialize};

const BASE_AFFINITY: f64 = 0.3;
const NEUTRAL_PERFORMANCE: f64 = 0.5;

/// Relative weight of each signal (normalized before use)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecommendationWeights {
    pub context: f64,
    pub performance: f64,
    pub trend: f64,
}

impl Default for RecommendationWeights {
    fn default() -> Self {
        Self {
            context: 0.45,
            performance: 0.35,
            trend: 0.20,
        }
    }
}

impl RecommendationWeights {
    /// Weights scaled to sum to 1; falls back to defaults when degenerate.
    pub fn normalized(&self) -> Self {
        let parts = [self.context, self.performance, self.trend];
        if parts.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Self::default();
        }
        let total: f64 = parts.iter().sum();
        if total <= 0.0 {
            return Self::default();
        }
        Self {
            context: self.context / total,
            performance: self.performance / total,
            trend: self.trend / total,
        }
    }
}

/// Affinity of `flow_type` to the debate and participant, with reasons
pub fn context_affinity(
    flow_type: AgenticFlowType,
    debate: &DebateContext,
    participant: &ParticipantContext,
) -> (f64, Vec<String>) {
    use AgenticFlowType::*;

    let mut score = BASE_AFFINITY;
    let mut reasons = Vec::new();
    let mut bump = |amount: f64, reason: &str| {
        score += amount;
        reasons.push(reason.to_string());
    };

    if debate.requires_fact_checking {
        match flow_type {
            RagWithReranking => bump(0.35, "Grounds arguments in retrieved sources with citations"),
            ToolCallingVerification => bump(0.30, "Verifies factual claims with external tools"),
            ConfidenceScoring => bump(0.10, "Flags low-confidence factual claims"),
            _ => {}
        }
    }

    match debate.complexity {
        Complexity::High => match flow_type {
            TreeOfThoughts => bump(0.30, "Explores alternative lines of argument for a complex topic"),
            MultiAgentRedTeam => bump(0.25, "Stress-tests positions on a complex topic"),
            StepBackPrompting => bump(0.20, "Anchors a complex topic in first principles"),
            SelfCritiqueLoop => bump(0.15, "Iterative refinement suits complex arguments"),
            PromptChaining => bump(0.15, "Breaks a complex answer into staged reasoning"),
            _ => {}
        },
        Complexity::Low => match flow_type {
            InternalMonologue => bump(0.20, "Lightweight reasoning is enough for a simple topic"),
            PostProcessingRules => bump(0.20, "Fast, deterministic polishing for a simple topic"),
            _ => {}
        },
        Complexity::Medium => {
            if matches!(flow_type, InternalMonologue | SelfCritiqueLoop) {
                bump(0.10, "Balanced reasoning depth for a moderate topic");
            }
        }
    }

    if debate.sensitive_topic {
        match flow_type {
            ConstitutionalPrompting => bump(0.35, "Checks arguments against ethical principles"),
            PostProcessingRules => bump(0.15, "Enforces content rules on a sensitive topic"),
            _ => {}
        }
    }

    if debate.adversarial_format {
        match flow_type {
            MultiAgentRedTeam => bump(0.20, "Anticipates opposing rebuttals"),
            SelfCritiqueLoop => bump(0.10, "Pre-empts weaknesses an opponent would exploit"),
            _ => {}
        }
    }

    if debate.high_stakes {
        match flow_type {
            EnsembleVoting => bump(0.25, "Multiple candidates reduce variance when stakes are high"),
            ConfidenceScoring => bump(0.20, "Surfaces uncertainty when stakes are high"),
            _ => {}
        }
    }

    if participant.prefers(flow_type) {
        bump(0.15, "Preferred by the participant");
    }

    (score.clamp(0.0, 1.0), reasons)
}

/// Historical performance signal; neutral without history
pub fn performance_signal(analytics: Option<&FlowTypeAnalytics>) -> (f64, Vec<String>) {
    let Some(analytics) = analytics.filter(|a| !a.is_empty()) else {
        return (
            NEUTRAL_PERFORMANCE,
            vec!["No historical executions; performance assumed neutral".to_string()],
        );
    };

    let score = match analytics.average_confidence {
        Some(confidence) => 0.5 * analytics.success_rate + 0.5 * (confidence / 100.0),
        None => analytics.success_rate,
    };

    let mut reasons = vec![format!(
        "{:.0}% success over {} executions",
        analytics.success_rate * 100.0,
        analytics.execution_count
    )];
    if let Some(confidence) = analytics.average_confidence {
        reasons.push(format!("Average confidence {:.1}", confidence));
    }

    (score.clamp(0.0, 1.0), reasons)
}

/// Combine the three signals into one recommendation entry
pub fn score_flow_type(
    flow_type: AgenticFlowType,
    debate: &DebateContext,
    participant: &ParticipantContext,
    history: Option<&FlowTypeAnalytics>,
    trend_score: f64,
    weights: RecommendationWeights,
) -> FlowTypeRecommendation {
    let weights = weights.normalized();
    let (context_score, mut reasons) = context_affinity(flow_type, debate, participant);
    let (performance_score, performance_reasons) = performance_signal(history);
    reasons.extend(performance_reasons);

    let trend_score = trend_score.clamp(0.0, 1.0);
    if trend_score > 0.0 {
        reasons.push(format!("Trend score {:.2}", trend_score));
    }

    FlowTypeRecommendation {
        flow_type,
        score: weights.context * context_score
            + weights.performance * performance_score
            + weights.trend * trend_score,
        context_score,
        performance_score,
        trend_score,
        reasons,
    }
}

/// Diagnose live performance degradation.
///
/// | Condition | Points |
/// |-----------|--------|
/// | confidence < 50 / < 70 | 2 / 1 |
/// | avg execution time > 10s / > 5s | 2 / 1 |
/// | response change rate < 0.1 | 1 |
/// | error rate > 0.3 / > 0.1 | 2 / 1 |
///
/// Two or more points is a significant issue.
pub fn analyze_performance(context: &PerformanceContext) -> PerformanceAnalysis {
    let mut points = 0u32;
    let mut issues = Vec::new();

    if context.average_confidence < 50.0 {
        points += 2;
        issues.push(format!(
            "Very low average confidence ({:.1})",
            context.average_confidence
        ));
    } else if context.average_confidence < 70.0 {
        points += 1;
        issues.push(format!(
            "Below-target average confidence ({:.1})",
            context.average_confidence
        ));
    }

    if context.average_execution_time_ms > 10_000.0 {
        points += 2;
        issues.push(format!(
            "Very slow execution ({:.0} ms average)",
            context.average_execution_time_ms
        ));
    } else if context.average_execution_time_ms > 5_000.0 {
        points += 1;
        issues.push(format!(
            "Slow execution ({:.0} ms average)",
            context.average_execution_time_ms
        ));
    }

    if context.response_change_rate < 0.1 {
        points += 1;
        issues.push(format!(
            "Flow rarely changes the answer ({:.0}% of turns)",
            context.response_change_rate * 100.0
        ));
    }

    if context.error_rate > 0.3 {
        points += 2;
        issues.push(format!("High error rate ({:.0}%)", context.error_rate * 100.0));
    } else if context.error_rate > 0.1 {
        points += 1;
        issues.push(format!(
            "Elevated error rate ({:.0}%)",
            context.error_rate * 100.0
        ));
    }

    PerformanceAnalysis {
        has_significant_issues: points >= 2,
        issues,
        severity_points: points,
        switch_urgency: SwitchUrgency::from_severity(points),
    }
}
