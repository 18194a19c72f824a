//! Presentation layer for agentic-flow
//!
//! This crate contains CLI definitions and report formatters.

pub mod cli;
pub mod output;

// Re-export commonly used types
pub use cli::commands::{Cli, Command, OutputFormat};
pub use output::console::ConsoleFormatter;
