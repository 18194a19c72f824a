//! In-memory analytics repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use flow_application::{AgenticFlowAnalyticsRepository, RepositoryError};
use flow_domain::{
    AgenticFlowExecution, AgenticFlowType, FlowPerformanceMetrics, ResponseImprovement,
};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// Executions and telemetry held in memory, shared by both repositories.
#[derive(Debug, Default)]
pub(crate) struct ExecutionStore {
    executions: Vec<AgenticFlowExecution>,
    metrics: Vec<FlowPerformanceMetrics>,
}

impl ExecutionStore {
    pub(crate) fn push_execution(&mut self, execution: AgenticFlowExecution) {
        self.executions.push(execution);
    }

    pub(crate) fn push_metrics(&mut self, metrics: FlowPerformanceMetrics) {
        self.metrics.push(metrics);
    }

    pub(crate) fn contains(&self, execution_id: Uuid) -> bool {
        self.executions.iter().any(|e| e.id == execution_id)
    }

    pub(crate) fn set_improvement(
        &mut self,
        execution_id: Uuid,
        improvement: ResponseImprovement,
    ) -> Result<(), RepositoryError> {
        let execution = self
            .executions
            .iter_mut()
            .find(|e| e.id == execution_id)
            .ok_or(RepositoryError::NotFound(execution_id))?;
        execution.response_improvement = Some(improvement);
        Ok(())
    }

    pub(crate) fn metrics(&self) -> &[FlowPerformanceMetrics] {
        &self.metrics
    }

    pub(crate) fn len(&self) -> usize {
        self.executions.len()
    }

    /// Matching executions in insertion order
    pub(crate) fn select(
        &self,
        filter: impl Fn(&AgenticFlowExecution) -> bool,
    ) -> Vec<AgenticFlowExecution> {
        self.executions
            .iter()
            .filter(|e| filter(e))
            .cloned()
            .collect()
    }

    pub(crate) fn by_organization(
        &self,
        organization_id: &str,
        flow_type: Option<AgenticFlowType>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<AgenticFlowExecution> {
        self.select(|e| {
            e.organization_id == organization_id
                && flow_type.is_none_or(|t| e.flow_type == t)
                && e.timestamp >= start
                && e.timestamp <= end
        })
    }
}

pub(crate) fn lock(store: &Mutex<ExecutionStore>) -> Result<MutexGuard<'_, ExecutionStore>, RepositoryError> {
    store
        .lock()
        .map_err(|_| RepositoryError::Storage("execution store lock poisoned".to_string()))
}

/// Repository that keeps everything in process memory
#[derive(Debug, Default)]
pub struct InMemoryAnalyticsRepository {
    store: Mutex<ExecutionStore>,
}

impl InMemoryAnalyticsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored executions
    pub fn len(&self) -> usize {
        lock(&self.store).map(|store| store.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stored performance metrics, oldest first
    pub fn performance_metrics(&self) -> Vec<FlowPerformanceMetrics> {
        lock(&self.store)
            .map(|store| store.metrics().to_vec())
            .unwrap_or_default()
    }
}

#[async_trait]
impl AgenticFlowAnalyticsRepository for InMemoryAnalyticsRepository {
    async fn save(&self, execution: &AgenticFlowExecution) -> Result<(), RepositoryError> {
        lock(&self.store)?.push_execution(execution.clone());
        Ok(())
    }

    async fn save_performance_metrics(
        &self,
        metrics: &FlowPerformanceMetrics,
    ) -> Result<(), RepositoryError> {
        lock(&self.store)?.push_metrics(metrics.clone());
        Ok(())
    }

    async fn find_by_organization_and_flow_type_and_date_range(
        &self,
        organization_id: &str,
        flow_type: AgenticFlowType,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<AgenticFlowExecution>, RepositoryError> {
        Ok(lock(&self.store)?.by_organization(organization_id, Some(flow_type), start, end))
    }

    async fn find_by_debate_id(
        &self,
        debate_id: &str,
    ) -> Result<Vec<AgenticFlowExecution>, RepositoryError> {
        Ok(lock(&self.store)?.select(|e| e.debate_id == debate_id))
    }

    async fn find_by_organization_and_date_range(
        &self,
        organization_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<AgenticFlowExecution>, RepositoryError> {
        Ok(lock(&self.store)?.by_organization(organization_id, None, start, end))
    }

    async fn update_response_improvement(
        &self,
        execution_id: Uuid,
        improvement: &ResponseImprovement,
    ) -> Result<(), RepositoryError> {
        lock(&self.store)?.set_improvement(execution_id, improvement.clone())
    }
}
