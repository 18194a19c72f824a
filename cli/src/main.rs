//! CLI entrypoint for agentic-flow
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Result, anyhow, bail};
use chrono::Utc;
use clap::{CommandFactory, Parser};
use flow_application::{
    AgenticFlowAnalyticsRepository, AgenticFlowAnalyticsService, EngineConfig, FlowEventLogger,
    FlowRecommendationService, NoFlowEventLogger,
};
use flow_domain::{
    AgenticFlowType, DebateContext, ParticipantContext, PerformanceContext, ResponseImprovement,
    analyze_performance, window_start,
};
use flow_infrastructure::{
    ConfigLoader, FileConfig, InMemoryAnalyticsRepository, JsonlAnalyticsRepository,
    JsonlFlowEventLogger,
};
use flow_presentation::{Cli, Command, ConsoleFormatter, OutputFormat};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    let file_config: FileConfig = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };

    let issues = file_config.validate();
    if !issues.is_empty() {
        for issue in &issues {
            warn!("Config: {}", issue);
        }
        bail!(
            "Invalid configuration ({} issue{})",
            issues.len(),
            if issues.len() == 1 { "" } else { "s" }
        );
    }
    let engine = file_config.to_engine_config();

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    // === Dependency Injection ===
    let event_logger: Arc<dyn FlowEventLogger> = match &file_config.logging.flow_event_log {
        Some(path) => match JsonlFlowEventLogger::new(path) {
            Some(logger) => Arc::new(logger),
            None => Arc::new(NoFlowEventLogger),
        },
        None => Arc::new(NoFlowEventLogger),
    };

    let log_path = cli.log.or(file_config.storage.execution_log);
    match log_path {
        Some(path) => {
            info!("Reading executions from {}", path.display());
            let repository = Arc::new(JsonlAnalyticsRepository::open(&path)?);
            run(command, repository, engine, event_logger, cli.output).await
        }
        None => {
            warn!("No execution log configured; reporting on an empty in-memory store");
            let repository = Arc::new(InMemoryAnalyticsRepository::new());
            run(command, repository, engine, event_logger, cli.output).await
        }
    }
}

async fn run<R: AgenticFlowAnalyticsRepository + 'static>(
    command: Command,
    repository: Arc<R>,
    engine: EngineConfig,
    event_logger: Arc<dyn FlowEventLogger>,
    output: OutputFormat,
) -> Result<()> {
    let analytics = Arc::new(
        AgenticFlowAnalyticsService::new(repository, engine.analytics)
            .with_event_logger(event_logger),
    );
    let recommendations =
        FlowRecommendationService::new(Arc::clone(&analytics)).with_settings(engine.recommendation);
    let now = Utc::now();

    let report = match command {
        Command::Flows => render(output, AgenticFlowType::all(), ConsoleFormatter::format_flow_types),
        Command::Analytics { org, flow, days } => {
            let start = window_start(now, days);
            let stats = analytics.get_flow_type_analytics(&org, flow, start, now).await?;
            render(output, &stats, ConsoleFormatter::format_analytics)
        }
        Command::Trending { org, days, limit } => {
            let days = days.unwrap_or(engine.analytics.trend_window_days);
            let trends = analytics
                .get_trending_flow_types(&org, now, days, limit)
                .await?;
            render(output, trends.as_slice(), ConsoleFormatter::format_trends)
        }
        Command::Summary { debate } => {
            let summary = analytics.get_debate_summary(&debate).await?;
            render(output, &summary, ConsoleFormatter::format_summary)
        }
        Command::Compare { org, flows, days } => {
            let start = window_start(now, days);
            let comparison = recommendations
                .compare_flow_types(&org, &flows, start, now)
                .await?;
            render(output, comparison.as_slice(), ConsoleFormatter::format_comparison)
        }
        Command::Recommend {
            org,
            debate,
            topic,
            participant,
            complexity,
            fact_check,
            sensitive,
            adversarial,
            high_stakes,
            prefer,
        } => {
            let debate = DebateContext::new(debate, topic)
                .with_complexity(complexity)
                .with_fact_checking(fact_check)
                .with_sensitive_topic(sensitive)
                .with_adversarial_format(adversarial)
                .with_high_stakes(high_stakes);
            let participant = prefer
                .into_iter()
                .fold(ParticipantContext::new(participant), |p, flow_type| {
                    p.with_preferred(flow_type)
                });
            let recommendation = recommendations
                .recommend_flow_types(&org, &debate, &participant)
                .await?;
            render(output, &recommendation, ConsoleFormatter::format_recommendation)
        }
        Command::Assess {
            confidence,
            change_rate,
            avg_time_ms,
            error_rate,
            current,
            org,
        } => {
            let performance =
                PerformanceContext::new(confidence, change_rate, avg_time_ms).with_error_rate(error_rate);
            match (current, org) {
                (Some(current), Some(org)) => {
                    let adaptive = recommendations
                        .recommend_adaptive_switch(
                            &org,
                            current,
                            &performance,
                            &DebateContext::default(),
                            &ParticipantContext::default(),
                        )
                        .await?;
                    render(output, &adaptive, ConsoleFormatter::format_adaptive)
                }
                _ => render(
                    output,
                    &analyze_performance(&performance),
                    ConsoleFormatter::format_analysis,
                ),
            }
        }
        Command::Improve {
            execution,
            improved,
            score,
            note,
        } => {
            let mut improvement = ResponseImprovement::new(improved);
            if let Some(score) = score {
                improvement = improvement.with_score(score);
            }
            if let Some(note) = note {
                improvement = improvement.with_note(note);
            }
            analytics
                .update_response_improvement(execution, improvement)
                .await?;
            format!("Updated execution {}", execution)
        }
    };

    println!("{}", report);
    Ok(())
}

fn render<T: Serialize + ?Sized>(output: OutputFormat, value: &T, text: fn(&T) -> String) -> String {
    match output {
        OutputFormat::Text => text(value),
        OutputFormat::Json => ConsoleFormatter::format_json(value),
    }
}
