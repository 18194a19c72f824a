//! Agentic flow domain
//!
//! Value types passed into and out of every flow processor, plus the pure
//! text heuristics the processors use to interpret model output.

pub mod configuration;
pub mod context;
pub mod document;
pub mod flow_type;
pub mod parsing;
pub mod result;
pub mod rules;
pub mod tool;
