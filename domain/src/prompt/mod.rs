//! Prompt domain
//!
//! Templates for generating prompts at each step of an agentic flow.

mod template;

pub use template::FlowPromptTemplate;
