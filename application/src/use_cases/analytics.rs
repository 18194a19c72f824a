//! Flow analytics use case
//!
//! Records flow executions and answers aggregate queries over them. Every
//! operation runs as its own task on a bounded worker pool (a semaphore of
//! `max_concurrent_tasks` permits) and is joined under `task_deadline`.
//!
//! | Operation | Failure handling |
//! |-----------|------------------|
//! | `record_execution` | surfaced to the caller |
//! | `record_performance_metrics` | logged and swallowed |
//! | queries / `update_response_improvement` | surfaced to the caller |

use crate::config::AnalyticsSettings;
use crate::ports::analytics_repository::{AgenticFlowAnalyticsRepository, RepositoryError};
use crate::ports::flow_event_logger::{FlowEvent, FlowEventLogger, NoFlowEventLogger};
use chrono::{DateTime, Utc};
use flow_domain::{
    AgenticFlowExecution, AgenticFlowResult, AgenticFlowType, DebateFlowSummary,
    FlowPerformanceMetrics, FlowTypeAnalytics, FlowTypeTrend, ResponseImprovement,
    analytics_by_flow_type, compute_trends, window_start,
};
use serde_json::json;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Errors that can occur in the analytics service
#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Analytics task exceeded its deadline of {0:?}")]
    Timeout(Duration),

    #[error("Analytics task failed: {0}")]
    TaskFailed(String),

    #[error("Analytics worker pool is closed")]
    PoolClosed,
}

/// Input for [`AgenticFlowAnalyticsService::record_execution`]
#[derive(Debug, Clone)]
pub struct ExecutionRecordRequest {
    pub flow_id: String,
    pub debate_id: String,
    pub organization_id: String,
    pub flow_type: AgenticFlowType,
    pub result: AgenticFlowResult,
    pub execution_time: Duration,
}

impl ExecutionRecordRequest {
    pub fn new(
        flow_id: impl Into<String>,
        debate_id: impl Into<String>,
        organization_id: impl Into<String>,
        flow_type: AgenticFlowType,
        result: AgenticFlowResult,
    ) -> Self {
        Self {
            flow_id: flow_id.into(),
            debate_id: debate_id.into(),
            organization_id: organization_id.into(),
            flow_type,
            result,
            execution_time: Duration::ZERO,
        }
    }

    pub fn with_execution_time(mut self, execution_time: Duration) -> Self {
        self.execution_time = execution_time;
        self
    }
}

/// Analytics over recorded flow executions
pub struct AgenticFlowAnalyticsService<R: AgenticFlowAnalyticsRepository + 'static> {
    repository: Arc<R>,
    permits: Arc<Semaphore>,
    settings: AnalyticsSettings,
    event_logger: Arc<dyn FlowEventLogger>,
}

impl<R: AgenticFlowAnalyticsRepository + 'static> AgenticFlowAnalyticsService<R> {
    pub fn new(repository: Arc<R>, settings: AnalyticsSettings) -> Self {
        Self {
            repository,
            permits: Arc::new(Semaphore::new(
                settings
                    .max_concurrent_tasks
                    .clamp(1, Semaphore::MAX_PERMITS),
            )),
            settings,
            event_logger: Arc::new(NoFlowEventLogger),
        }
    }

    pub fn with_event_logger(mut self, event_logger: Arc<dyn FlowEventLogger>) -> Self {
        self.event_logger = event_logger;
        self
    }

    pub fn settings(&self) -> &AnalyticsSettings {
        &self.settings
    }

    /// Spawn `task` on the worker pool and join it under the task deadline.
    async fn run<T, F, Fut>(&self, task: F) -> Result<T, AnalyticsError>
    where
        T: Send + 'static,
        F: FnOnce(Arc<R>) -> Fut,
        Fut: Future<Output = Result<T, AnalyticsError>> + Send + 'static,
    {
        let permits = Arc::clone(&self.permits);
        let work = task(Arc::clone(&self.repository));
        let handle = tokio::spawn(async move {
            let _permit = permits
                .acquire_owned()
                .await
                .map_err(|_| AnalyticsError::PoolClosed)?;
            work.await
        });
        let abort = handle.abort_handle();

        let deadline = self.settings.task_deadline;
        match tokio::time::timeout(deadline, handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(AnalyticsError::TaskFailed(join_error.to_string())),
            Err(_) => {
                abort.abort();
                Err(AnalyticsError::Timeout(deadline))
            }
        }
    }

    /// Build and persist the audit record for one flow invocation.
    ///
    /// Persistence failures are returned: a lost audit record must be visible.
    pub async fn record_execution(
        &self,
        request: ExecutionRecordRequest,
    ) -> Result<AgenticFlowExecution, AnalyticsError> {
        let execution = AgenticFlowExecution::new(
            request.flow_id,
            request.debate_id,
            request.organization_id,
            request.flow_type,
        )
        .with_result(&request.result, request.execution_time);

        let saved = self
            .run(move |repository| async move {
                repository.save(&execution).await?;
                Ok(execution)
            })
            .await?;

        info!(
            "Recorded {} execution {} ({})",
            saved.flow_type, saved.id, saved.status
        );
        self.event_logger.log(FlowEvent::new(
            "execution_recorded",
            json!({
                "execution_id": saved.id,
                "flow_type": saved.flow_type,
                "debate_id": saved.debate_id,
                "organization_id": saved.organization_id,
                "status": saved.status,
                "confidence": saved.confidence,
                "execution_time_ms": saved.execution_time_ms,
            }),
        ));
        Ok(saved)
    }

    /// Best-effort telemetry. Failures are logged at `warn` and swallowed;
    /// the handle only tells the caller when the attempt is over.
    pub fn record_performance_metrics(
        &self,
        execution_id: Uuid,
        flow_type: AgenticFlowType,
        result: &AgenticFlowResult,
    ) -> JoinHandle<()> {
        let metrics = FlowPerformanceMetrics::from_result(execution_id, flow_type, result);
        let repository = Arc::clone(&self.repository);
        let permits = Arc::clone(&self.permits);
        let event_logger = Arc::clone(&self.event_logger);
        let deadline = self.settings.task_deadline;

        tokio::spawn(async move {
            let attempt = tokio::time::timeout(deadline, async {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|_| AnalyticsError::PoolClosed)?;
                repository
                    .save_performance_metrics(&metrics)
                    .await
                    .map_err(AnalyticsError::from)
            })
            .await
            .unwrap_or(Err(AnalyticsError::Timeout(deadline)));

            match attempt {
                Ok(()) => debug!("Saved performance metrics for {}", execution_id),
                Err(error) => {
                    warn!(
                        "Dropping performance metrics for {}: {}",
                        execution_id, error
                    );
                    event_logger.log(FlowEvent::new(
                        "performance_metrics_dropped",
                        json!({
                            "execution_id": execution_id,
                            "flow_type": flow_type,
                            "error": error.to_string(),
                        }),
                    ));
                }
            }
        })
    }

    pub async fn get_flow_type_analytics(
        &self,
        organization_id: &str,
        flow_type: AgenticFlowType,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<FlowTypeAnalytics, AnalyticsError> {
        let organization_id = organization_id.to_string();
        self.run(move |repository| async move {
            let executions = repository
                .find_by_organization_and_flow_type_and_date_range(
                    &organization_id,
                    flow_type,
                    start,
                    end,
                )
                .await?;
            Ok(FlowTypeAnalytics::from_executions(flow_type, &executions))
        })
        .await
    }

    /// Per-flow-type analytics for every type the organization used
    pub async fn get_organization_statistics(
        &self,
        organization_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<BTreeMap<AgenticFlowType, FlowTypeAnalytics>, AnalyticsError> {
        let organization_id = organization_id.to_string();
        self.run(move |repository| async move {
            let executions = repository
                .find_by_organization_and_date_range(&organization_id, start, end)
                .await?;
            Ok(analytics_by_flow_type(&executions))
        })
        .await
    }

    pub async fn get_debate_summary(
        &self,
        debate_id: &str,
    ) -> Result<DebateFlowSummary, AnalyticsError> {
        let debate_id = debate_id.to_string();
        self.run(move |repository| async move {
            let executions = repository.find_by_debate_id(&debate_id).await?;
            Ok(DebateFlowSummary::from_executions(debate_id, &executions))
        })
        .await
    }

    /// Top `limit` flow types by trend score over the `window_days` before `now`
    pub async fn get_trending_flow_types(
        &self,
        organization_id: &str,
        now: DateTime<Utc>,
        window_days: u32,
        limit: usize,
    ) -> Result<Vec<FlowTypeTrend>, AnalyticsError> {
        let organization_id = organization_id.to_string();
        let start = window_start(now, window_days);
        self.run(move |repository| async move {
            let executions = repository
                .find_by_organization_and_date_range(&organization_id, start, now)
                .await?;
            let mut trends = compute_trends(&executions);
            trends.truncate(limit);
            Ok(trends)
        })
        .await
    }

    /// Annotate a saved execution; the only mutation an execution allows
    pub async fn update_response_improvement(
        &self,
        execution_id: Uuid,
        improvement: ResponseImprovement,
    ) -> Result<(), AnalyticsError> {
        let logged = improvement.clone();
        self.run(move |repository| async move {
            repository
                .update_response_improvement(execution_id, &improvement)
                .await?;
            Ok(())
        })
        .await?;

        self.event_logger.log(FlowEvent::new(
            "response_improvement_updated",
            json!({
                "execution_id": execution_id,
                "improved": logged.improved,
                "score": logged.score,
            }),
        ));
        Ok(())
    }
}
