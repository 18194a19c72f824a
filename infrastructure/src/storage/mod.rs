//! Analytics storage adapters
//!
//! Implementations of the
//! [`AgenticFlowAnalyticsRepository`](flow_application::AgenticFlowAnalyticsRepository)
//! port: [`InMemoryAnalyticsRepository`] for tests and one-shot runs, and
//! [`JsonlAnalyticsRepository`] for an append-only execution log on disk.

mod jsonl;
mod memory;

pub use jsonl::JsonlAnalyticsRepository;
pub use memory::InMemoryAnalyticsRepository;
