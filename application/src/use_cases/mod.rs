//! Use cases
//!
//! Application-level operations over recorded flow executions.

pub mod analytics;
pub mod recommendation;
