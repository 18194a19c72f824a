//! Flow analytics domain
//!
//! - [`execution::AgenticFlowExecution`] - append-only audit record
//! - [`execution::FlowPerformanceMetrics`] - best-effort telemetry record
//! - [`aggregate`] - pure aggregation (per-type analytics, trends, debate summaries)

pub mod aggregate;
pub mod execution;
