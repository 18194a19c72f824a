//! Flow recommendation use case
//!
//! Scores every flow type for a debate and participant, and decides whether
//! a participant should switch flows mid-debate. Reads history only through
//! [`AgenticFlowAnalyticsService`]; nothing computed here is persisted.

use crate::config::RecommendationSettings;
use crate::ports::analytics_repository::AgenticFlowAnalyticsRepository;
use crate::use_cases::analytics::{AgenticFlowAnalyticsService, AnalyticsError};
use chrono::{DateTime, Utc};
use flow_domain::{
    AdaptiveFlowRecommendation, AgenticFlowType, DebateContext, FlowRecommendation,
    FlowTypeAnalytics, ParticipantContext, PerformanceAnalysis, PerformanceContext,
    analyze_performance, recommendation::scoring::score_flow_type, window_start,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info};

/// Alternatives listed on an adaptive recommendation
const MAX_ALTERNATIVES: usize = 3;

/// Stand-in expiry for deadlines past what `Instant` can represent (~30 years)
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Errors that can occur in the recommendation service
#[derive(Error, Debug)]
pub enum RecommendationError {
    #[error("Analytics error: {0}")]
    Analytics(#[from] AnalyticsError),

    #[error("Comparison exceeded its deadline of {deadline:?} ({completed}/{requested} flow types read)")]
    Timeout {
        deadline: Duration,
        completed: usize,
        requested: usize,
    },

    #[error("Comparison task failed: {0}")]
    TaskFailed(String),
}

/// Explainable flow-type recommendations
pub struct FlowRecommendationService<R: AgenticFlowAnalyticsRepository + 'static> {
    analytics: Arc<AgenticFlowAnalyticsService<R>>,
    settings: RecommendationSettings,
}

impl<R: AgenticFlowAnalyticsRepository + 'static> FlowRecommendationService<R> {
    pub fn new(analytics: Arc<AgenticFlowAnalyticsService<R>>) -> Self {
        Self {
            analytics,
            settings: RecommendationSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: RecommendationSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Score every flow type, best first.
    pub async fn recommend_flow_types(
        &self,
        organization_id: &str,
        debate: &DebateContext,
        participant: &ParticipantContext,
    ) -> Result<FlowRecommendation, RecommendationError> {
        let now = Utc::now();
        let window_days = self.settings.history_window_days;
        let start = window_start(now, window_days);

        let history = self
            .analytics
            .get_organization_statistics(organization_id, start, now)
            .await?;
        let trends = self
            .analytics
            .get_trending_flow_types(organization_id, now, window_days, usize::MAX)
            .await?;

        let max_trend = trends
            .iter()
            .map(|t| t.trend_score)
            .fold(0.0f64, f64::max);
        let trend_scores: BTreeMap<AgenticFlowType, f64> = trends
            .iter()
            .map(|t| {
                let normalized = if max_trend > 0.0 {
                    t.trend_score / max_trend
                } else {
                    0.0
                };
                (t.flow_type, normalized)
            })
            .collect();

        let scored = AgenticFlowType::all()
            .iter()
            .map(|&flow_type| {
                score_flow_type(
                    flow_type,
                    debate,
                    participant,
                    history.get(&flow_type),
                    trend_scores.get(&flow_type).copied().unwrap_or(0.0),
                    self.settings.weights,
                )
            })
            .collect();

        let recommendation = FlowRecommendation::new(scored);
        if let Some(primary) = recommendation.primary() {
            info!(
                "Recommended {} for debate {} (score {:.2})",
                primary.flow_type, debate.debate_id, primary.score
            );
        }
        Ok(recommendation)
    }

    pub fn analyze_performance(&self, context: &PerformanceContext) -> PerformanceAnalysis {
        analyze_performance(context)
    }

    /// Decide whether the participant should leave `current_flow_type`.
    pub async fn recommend_adaptive_switch(
        &self,
        organization_id: &str,
        current_flow_type: AgenticFlowType,
        performance: &PerformanceContext,
        debate: &DebateContext,
        participant: &ParticipantContext,
    ) -> Result<AdaptiveFlowRecommendation, RecommendationError> {
        let analysis = analyze_performance(performance);
        let ranked = self
            .recommend_flow_types(organization_id, debate, participant)
            .await?;

        let alternatives: Vec<_> = ranked
            .recommendations()
            .iter()
            .filter(|r| r.flow_type != current_flow_type)
            .take(MAX_ALTERNATIVES)
            .cloned()
            .collect();
        let best = ranked.best_excluding(current_flow_type);
        let should_switch = analysis.switch_urgency.warrants_switch() && best.is_some();

        let reason = match best {
            Some(best) if should_switch => format!(
                "{} is underperforming ({}); switch to {}",
                current_flow_type.display_name(),
                analysis.issues.join("; "),
                best.flow_type.display_name()
            ),
            _ if analysis.issues.is_empty() => format!(
                "{} is performing within targets",
                current_flow_type.display_name()
            ),
            _ => format!(
                "Minor issues with {} ({}); keep the current flow",
                current_flow_type.display_name(),
                analysis.issues.join("; ")
            ),
        };

        debug!(
            "Adaptive check for {}: {} points, urgency {}",
            current_flow_type, analysis.severity_points, analysis.switch_urgency
        );

        Ok(AdaptiveFlowRecommendation {
            current_flow_type,
            should_switch,
            switch_urgency: analysis.switch_urgency,
            recommended_flow_type: best.filter(|_| should_switch).map(|r| r.flow_type),
            alternatives,
            reason,
            analysis,
        })
    }

    /// Analytics for each requested flow type, in request order.
    ///
    /// One read per type runs concurrently; if any read is still pending when
    /// the comparison deadline passes, the whole comparison fails.
    pub async fn compare_flow_types(
        &self,
        organization_id: &str,
        flow_types: &[AgenticFlowType],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<FlowTypeAnalytics>, RecommendationError> {
        let requested = flow_types.len();
        let deadline = self.settings.comparison_deadline;
        let started = Instant::now();
        let expires_at = started
            .checked_add(deadline)
            .unwrap_or_else(|| started + FAR_FUTURE);

        let mut reads = JoinSet::new();
        for (index, &flow_type) in flow_types.iter().enumerate() {
            let analytics = Arc::clone(&self.analytics);
            let organization_id = organization_id.to_string();
            reads.spawn(async move {
                let result = analytics
                    .get_flow_type_analytics(&organization_id, flow_type, start, end)
                    .await;
                (index, result)
            });
        }

        let mut slots: Vec<Option<FlowTypeAnalytics>> = vec![None; requested];
        let mut completed = 0usize;
        while completed < requested {
            let joined = match tokio::time::timeout_at(expires_at, reads.join_next()).await {
                Ok(Some(joined)) => joined,
                Ok(None) => break,
                Err(_) => {
                    reads.abort_all();
                    return Err(RecommendationError::Timeout {
                        deadline,
                        completed,
                        requested,
                    });
                }
            };
            let (index, result) =
                joined.map_err(|e| RecommendationError::TaskFailed(e.to_string()))?;
            slots[index] = Some(result?);
            completed += 1;
        }

        slots
            .into_iter()
            .map(|slot| {
                slot.ok_or_else(|| {
                    RecommendationError::TaskFailed("comparison read went missing".to_string())
                })
            })
            .collect()
    }
}
