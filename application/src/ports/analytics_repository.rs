//! Persistence port for flow execution records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use flow_domain::{
    AgenticFlowExecution, AgenticFlowType, FlowPerformanceMetrics, ResponseImprovement,
};
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur in an analytics repository
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Execution not found: {0}")]
    NotFound(Uuid),
}

/// Append-only store of [`AgenticFlowExecution`] records.
///
/// Date ranges are inclusive on both ends.
#[async_trait]
pub trait AgenticFlowAnalyticsRepository: Send + Sync {
    async fn save(&self, execution: &AgenticFlowExecution) -> Result<(), RepositoryError>;

    async fn save_performance_metrics(
        &self,
        metrics: &FlowPerformanceMetrics,
    ) -> Result<(), RepositoryError>;

    async fn find_by_organization_and_flow_type_and_date_range(
        &self,
        organization_id: &str,
        flow_type: AgenticFlowType,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<AgenticFlowExecution>, RepositoryError>;

    async fn find_by_debate_id(
        &self,
        debate_id: &str,
    ) -> Result<Vec<AgenticFlowExecution>, RepositoryError>;

    async fn find_by_organization_and_date_range(
        &self,
        organization_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<AgenticFlowExecution>, RepositoryError>;

    /// The only mutation allowed on a saved execution
    async fn update_response_improvement(
        &self,
        execution_id: Uuid,
        improvement: &ResponseImprovement,
    ) -> Result<(), RepositoryError>;
}
