//! Pure aggregation over execution windows.
//!
//! The analytics service fetches a window of [`AgenticFlowExecution`]s from
//! the repository and hands it to these functions; nothing here does I/O.

use crate::analytics::execution::AgenticFlowExecution;
use crate::flow::flow_type::AgenticFlowType;
use crate::flow::result::FlowStatus;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Trend score weight for relative usage volume
pub const TREND_WEIGHT_USAGE: f64 = 0.4;
/// Trend score weight for average confidence (scaled to `[0, 1]`)
pub const TREND_WEIGHT_CONFIDENCE: f64 = 0.3;
/// Trend score weight for success rate
pub const TREND_WEIGHT_SUCCESS: f64 = 0.3;

/// Aggregate metrics for one flow type over an execution window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowTypeAnalytics {
    pub flow_type: AgenticFlowType,
    pub execution_count: usize,
    pub success_count: usize,
    pub failed_count: usize,
    pub partial_count: usize,
    pub success_rate: f64,
    /// Mean of the non-null confidences; `None` when there are none
    pub average_confidence: Option<f64>,
    pub average_execution_time_ms: f64,
    pub response_change_rate: f64,
}

impl FlowTypeAnalytics {
    /// Aggregate the supplied window. The window is taken as-is: the caller
    /// decides which executions belong to `flow_type`.
    pub fn from_executions<'a>(
        flow_type: AgenticFlowType,
        executions: impl IntoIterator<Item = &'a AgenticFlowExecution>,
    ) -> Self {
        let mut execution_count = 0usize;
        let mut success_count = 0usize;
        let mut failed_count = 0usize;
        let mut partial_count = 0usize;
        let mut changed_count = 0usize;
        let mut total_time_ms = 0f64;
        let mut confidence_sum = 0f64;
        let mut confidence_count = 0usize;

        for execution in executions {
            execution_count += 1;
            match execution.status {
                FlowStatus::Success => success_count += 1,
                FlowStatus::Failed => failed_count += 1,
                FlowStatus::Partial => partial_count += 1,
            }
            if execution.response_changed {
                changed_count += 1;
            }
            total_time_ms += execution.execution_time_ms as f64;
            if let Some(confidence) = execution.confidence {
                confidence_sum += confidence;
                confidence_count += 1;
            }
        }

        Self {
            flow_type,
            execution_count,
            success_count,
            failed_count,
            partial_count,
            success_rate: ratio(success_count, execution_count),
            average_confidence: (confidence_count > 0)
                .then(|| confidence_sum / confidence_count as f64),
            average_execution_time_ms: if execution_count == 0 {
                0.0
            } else {
                total_time_ms / execution_count as f64
            },
            response_change_rate: ratio(changed_count, execution_count),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.execution_count == 0
    }

    pub fn error_rate(&self) -> f64 {
        ratio(self.failed_count, self.execution_count)
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// Start of a trailing window of `days` ending at `now`.
///
/// Saturates at the earliest representable instant instead of overflowing.
pub fn window_start(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    TimeDelta::try_days(i64::from(days))
        .and_then(|span| now.checked_sub_signed(span))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Group a window by flow type and aggregate each group
pub fn analytics_by_flow_type(
    executions: &[AgenticFlowExecution],
) -> BTreeMap<AgenticFlowType, FlowTypeAnalytics> {
    let mut groups: BTreeMap<AgenticFlowType, Vec<&AgenticFlowExecution>> = BTreeMap::new();
    for execution in executions {
        groups.entry(execution.flow_type).or_default().push(execution);
    }
    groups
        .into_iter()
        .map(|(flow_type, group)| {
            (
                flow_type,
                FlowTypeAnalytics::from_executions(flow_type, group),
            )
        })
        .collect()
}

/// Usage/quality trend of one flow type over a trailing window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowTypeTrend {
    pub flow_type: AgenticFlowType,
    pub usage_count: usize,
    pub average_confidence: Option<f64>,
    pub success_rate: f64,
    /// Weighted composite in `[0, 1]`
    pub trend_score: f64,
}

/// Rank the flow types present in a window by trend score (descending).
///
/// `score = 0.4 * usage / max_usage + 0.3 * confidence / 100 + 0.3 * success_rate`;
/// a missing confidence contributes 0. Ties keep flow-type order.
pub fn compute_trends(executions: &[AgenticFlowExecution]) -> Vec<FlowTypeTrend> {
    let by_type = analytics_by_flow_type(executions);
    let max_usage = by_type
        .values()
        .map(|a| a.execution_count)
        .max()
        .unwrap_or(0);

    let mut trends: Vec<FlowTypeTrend> = by_type
        .into_values()
        .map(|analytics| {
            let usage = ratio(analytics.execution_count, max_usage);
            let confidence = analytics.average_confidence.unwrap_or(0.0) / 100.0;
            FlowTypeTrend {
                flow_type: analytics.flow_type,
                usage_count: analytics.execution_count,
                average_confidence: analytics.average_confidence,
                success_rate: analytics.success_rate,
                trend_score: TREND_WEIGHT_USAGE * usage
                    + TREND_WEIGHT_CONFIDENCE * confidence
                    + TREND_WEIGHT_SUCCESS * analytics.success_rate,
            }
        })
        .collect();

    trends.sort_by(|a, b| {
        b.trend_score
            .total_cmp(&a.trend_score)
            .then(a.flow_type.cmp(&b.flow_type))
    });
    trends
}

/// Flow usage within one debate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebateFlowSummary {
    pub debate_id: String,
    pub total_executions: usize,
    pub average_confidence: Option<f64>,
    pub response_change_rate: f64,
    pub by_flow_type: BTreeMap<AgenticFlowType, FlowTypeAnalytics>,
}

impl DebateFlowSummary {
    pub fn from_executions(debate_id: impl Into<String>, executions: &[AgenticFlowExecution]) -> Self {
        let confidences: Vec<f64> = executions.iter().filter_map(|e| e.confidence).collect();
        let changed = executions.iter().filter(|e| e.response_changed).count();
        Self {
            debate_id: debate_id.into(),
            total_executions: executions.len(),
            average_confidence: (!confidences.is_empty())
                .then(|| confidences.iter().sum::<f64>() / confidences.len() as f64),
            response_change_rate: ratio(changed, executions.len()),
            by_flow_type: analytics_by_flow_type(executions),
        }
    }
}
