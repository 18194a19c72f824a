//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use flow_domain::{AgenticFlowType, Complexity};
use std::path::PathBuf;
use uuid::Uuid;

/// Output format for reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored, human-readable report
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

/// CLI arguments for agentic-flow
#[derive(Parser, Debug)]
#[command(name = "agentic-flow")]
#[command(author, version, about = "Analytics and recommendations for agentic debate flows")]
#[command(long_about = r#"
agentic-flow reports on the execution log written by the debate platform's
agentic flow engine, and recommends which flow a participant should use.

Configuration files are loaded from (in priority order):
1. AGENTIC_FLOW_<SECTION>__<KEY>   Environment variables
2. --config <path>                 Explicit config file
3. ./agentic-flow.toml             Project-level config
4. ~/.config/agentic-flow/config.toml   Global config

Example:
  agentic-flow flows
  agentic-flow trending --org acme --days 14
  agentic-flow recommend --org acme --complexity high --fact-check
  agentic-flow assess --confidence 45 --change-rate 0.4 --avg-time-ms 8000
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Execution log to read (overrides `storage.execution_log`)
    #[arg(long, value_name = "PATH", global = true)]
    pub log: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List every agentic flow type
    Flows,

    /// Aggregate metrics for one flow type
    Analytics {
        #[arg(long)]
        org: String,
        /// Flow type, e.g. tree-of-thoughts
        #[arg(long)]
        flow: AgenticFlowType,
        /// Trailing window in days
        #[arg(long, default_value_t = 30)]
        days: u32,
    },

    /// Flow types ranked by trend score
    Trending {
        #[arg(long)]
        org: String,
        /// Trailing window in days (defaults to `analytics.trend_window_days`)
        #[arg(long)]
        days: Option<u32>,
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },

    /// Flow usage within one debate
    Summary {
        #[arg(long)]
        debate: String,
    },

    /// Side-by-side metrics for several flow types
    Compare {
        #[arg(long)]
        org: String,
        /// Flow types to compare (repeatable)
        #[arg(long = "flow", required = true)]
        flows: Vec<AgenticFlowType>,
        #[arg(long, default_value_t = 30)]
        days: u32,
    },

    /// Recommend flow types for a debate
    Recommend {
        #[arg(long)]
        org: String,
        #[arg(long, default_value = "cli")]
        debate: String,
        #[arg(long, default_value = "")]
        topic: String,
        #[arg(long, default_value = "cli")]
        participant: String,
        #[arg(long, default_value = "medium")]
        complexity: Complexity,
        /// Claims must be backed by sources
        #[arg(long)]
        fact_check: bool,
        /// Ethically or emotionally sensitive topic
        #[arg(long)]
        sensitive: bool,
        /// Participants argue against each other
        #[arg(long)]
        adversarial: bool,
        #[arg(long)]
        high_stakes: bool,
        /// Participant's preferred flow types (repeatable)
        #[arg(long, value_name = "TYPE")]
        prefer: Vec<AgenticFlowType>,
    },

    /// Diagnose live performance; with --current and --org, advise on switching
    Assess {
        /// Average confidence (0-100)
        #[arg(long)]
        confidence: f64,
        /// Share of turns where the flow changed the answer (0-1)
        #[arg(long)]
        change_rate: f64,
        #[arg(long)]
        avg_time_ms: f64,
        /// Share of failed invocations (0-1)
        #[arg(long, default_value_t = 0.0)]
        error_rate: f64,
        /// Flow type currently in use
        #[arg(long, requires = "org")]
        current: Option<AgenticFlowType>,
        #[arg(long)]
        org: Option<String>,
    },

    /// Annotate a recorded execution with whether it improved the answer
    Improve {
        /// Execution id from the log
        #[arg(long)]
        execution: Uuid,
        /// The flow improved the answer
        #[arg(long)]
        improved: bool,
        /// Improvement score (0-1)
        #[arg(long)]
        score: Option<f64>,
        #[arg(long)]
        note: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_recommend() {
        let cli = Cli::parse_from([
            "agentic-flow",
            "recommend",
            "--org",
            "acme",
            "--complexity",
            "high",
            "--fact-check",
            "--prefer",
            "tree-of-thoughts",
            "--prefer",
            "STEP_BACK_PROMPTING",
            "-o",
            "json",
        ]);

        assert_eq!(cli.output, OutputFormat::Json);
        let Some(Command::Recommend {
            org,
            complexity,
            fact_check,
            prefer,
            ..
        }) = cli.command
        else {
            panic!("expected recommend");
        };
        assert_eq!(org, "acme");
        assert_eq!(complexity, Complexity::High);
        assert!(fact_check);
        assert_eq!(
            prefer,
            vec![
                AgenticFlowType::TreeOfThoughts,
                AgenticFlowType::StepBackPrompting
            ]
        );
    }

    #[test]
    fn test_assess_current_requires_org() {
        let outcome = Cli::try_parse_from([
            "agentic-flow",
            "assess",
            "--confidence",
            "45",
            "--change-rate",
            "0.4",
            "--avg-time-ms",
            "8000",
            "--current",
            "internal-monologue",
        ]);
        assert!(outcome.is_err());
    }

    #[test]
    fn test_unknown_flow_type_rejected() {
        let outcome = Cli::try_parse_from([
            "agentic-flow",
            "analytics",
            "--org",
            "acme",
            "--flow",
            "mystery",
        ]);
        assert!(outcome.is_err());
    }
}
