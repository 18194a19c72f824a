//! Logging infrastructure: structured flow event logging.
//!
//! Provides [`JsonlFlowEventLogger`], a JSONL file writer that implements
//! the [`FlowEventLogger`](flow_application::FlowEventLogger) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlFlowEventLogger;
