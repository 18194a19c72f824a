//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod analytics_repository;
pub mod external_tool;
pub mod flow_event_logger;
pub mod llm_service;
pub mod rag_service;
pub mod service_error;
