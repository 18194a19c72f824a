//! Console output formatter for flow analytics and recommendations

use colored::Colorize;
use flow_domain::{
    AdaptiveFlowRecommendation, AgenticFlowType, DebateFlowSummary, FlowRecommendation,
    FlowTypeAnalytics, FlowTypeRecommendation, FlowTypeTrend, PerformanceAnalysis,
    SwitchUrgency,
};
use serde::Serialize;

/// Formats reports for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format any report as JSON
    pub fn format_json<T: Serialize + ?Sized>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn format_flow_types(flow_types: &[AgenticFlowType]) -> String {
        let mut output = Self::header("Agentic Flow Types");
        output.push('\n');
        for flow_type in flow_types {
            output.push_str(&format!(
                "\n{} {}\n  {}\n",
                format!("{:<28}", flow_type.as_str()).yellow().bold(),
                flow_type.display_name(),
                flow_type.description().dimmed()
            ));
        }
        output.push_str(&Self::footer());
        output
    }

    pub fn format_analytics(analytics: &FlowTypeAnalytics) -> String {
        let mut output = Self::header(analytics.flow_type.display_name());
        output.push('\n');
        output.push_str(&Self::analytics_body(analytics));
        output.push_str(&Self::footer());
        output
    }

    pub fn format_comparison(comparison: &[FlowTypeAnalytics]) -> String {
        let mut output = Self::header("Flow Type Comparison");
        output.push('\n');
        output.push_str(&format!(
            "\n{:<28} {:>6} {:>9} {:>11} {:>10} {:>8}\n",
            "Flow type".bold(),
            "Runs".bold(),
            "Success".bold(),
            "Confidence".bold(),
            "Avg ms".bold(),
            "Changed".bold()
        ));
        for analytics in comparison {
            output.push_str(&format!(
                "{:<28} {:>6} {:>8.0}% {:>11} {:>10.0} {:>7.0}%\n",
                analytics.flow_type.as_str(),
                analytics.execution_count,
                analytics.success_rate * 100.0,
                Self::confidence(analytics.average_confidence),
                analytics.average_execution_time_ms,
                analytics.response_change_rate * 100.0
            ));
        }
        output.push_str(&Self::footer());
        output
    }

    pub fn format_trends(trends: &[FlowTypeTrend]) -> String {
        let mut output = Self::header("Trending Flow Types");
        output.push('\n');
        if trends.is_empty() {
            output.push_str(&format!("\n{}\n", "No executions in this window.".dimmed()));
        }
        for (rank, trend) in trends.iter().enumerate() {
            output.push_str(&format!(
                "\n{} {} {}\n  {} runs, {:.0}% success, confidence {}\n",
                format!("{}.", rank + 1).cyan().bold(),
                trend.flow_type.display_name().bold(),
                format!("({:.3})", trend.trend_score).yellow(),
                trend.usage_count,
                trend.success_rate * 100.0,
                Self::confidence(trend.average_confidence)
            ));
        }
        output.push_str(&Self::footer());
        output
    }

    pub fn format_summary(summary: &DebateFlowSummary) -> String {
        let mut output = Self::header("Debate Flow Summary");
        output.push('\n');
        output.push_str(&format!(
            "{} {}\n{} {}\n{} {}\n{} {:.0}%\n",
            "Debate:".cyan().bold(),
            summary.debate_id,
            "Executions:".cyan().bold(),
            summary.total_executions,
            "Average confidence:".cyan().bold(),
            Self::confidence(summary.average_confidence),
            "Response change rate:".cyan().bold(),
            summary.response_change_rate * 100.0
        ));
        for analytics in summary.by_flow_type.values() {
            output.push_str(&Self::section_header(analytics.flow_type.display_name()));
            output.push_str(&Self::analytics_body(analytics));
        }
        output.push_str(&Self::footer());
        output
    }

    pub fn format_recommendation(recommendation: &FlowRecommendation) -> String {
        let mut output = Self::header("Flow Recommendations");
        output.push('\n');
        for (rank, entry) in recommendation.recommendations().iter().enumerate() {
            output.push_str(&Self::recommendation_entry(rank + 1, entry));
        }
        output.push_str(&Self::footer());
        output
    }

    pub fn format_analysis(analysis: &PerformanceAnalysis) -> String {
        let mut output = Self::header("Performance Assessment");
        output.push('\n');
        output.push_str(&Self::analysis_body(analysis));
        output.push_str(&Self::footer());
        output
    }

    pub fn format_adaptive(adaptive: &AdaptiveFlowRecommendation) -> String {
        let mut output = Self::header("Adaptive Flow Check");
        output.push('\n');
        output.push_str(&format!(
            "{} {}\n",
            "Current flow:".cyan().bold(),
            adaptive.current_flow_type.display_name()
        ));
        output.push_str(&Self::analysis_body(&adaptive.analysis));

        let verdict = match adaptive.recommended_flow_type {
            Some(next) if adaptive.should_switch => {
                format!("Switch to {}", next.display_name()).red().bold()
            }
            _ => "Keep the current flow".green().bold(),
        };
        output.push_str(&format!("\n{}\n{}\n", verdict, adaptive.reason));

        if !adaptive.alternatives.is_empty() {
            output.push_str(&Self::section_header("Alternatives"));
            for (rank, entry) in adaptive.alternatives.iter().enumerate() {
                output.push_str(&Self::recommendation_entry(rank + 1, entry));
            }
        }
        output.push_str(&Self::footer());
        output
    }

    fn analytics_body(analytics: &FlowTypeAnalytics) -> String {
        if analytics.is_empty() {
            return format!("{}\n", "No executions in this window.".dimmed());
        }
        format!(
            "  Executions:       {} ({} success, {} partial, {} failed)\n  Success rate:     {:.1}%\n  Avg confidence:   {}\n  Avg time:         {:.0} ms\n  Change rate:      {:.1}%\n",
            analytics.execution_count,
            analytics.success_count,
            analytics.partial_count,
            analytics.failed_count,
            analytics.success_rate * 100.0,
            Self::confidence(analytics.average_confidence),
            analytics.average_execution_time_ms,
            analytics.response_change_rate * 100.0
        )
    }

    fn analysis_body(analysis: &PerformanceAnalysis) -> String {
        let mut output = format!(
            "{} {} ({} points)\n",
            "Urgency:".cyan().bold(),
            Self::urgency(analysis.switch_urgency),
            analysis.severity_points
        );
        if analysis.issues.is_empty() {
            output.push_str(&format!("  {}\n", "No issues detected".green()));
        }
        for issue in &analysis.issues {
            output.push_str(&format!("  * {}\n", issue));
        }
        output
    }

    fn recommendation_entry(rank: usize, entry: &FlowTypeRecommendation) -> String {
        let mut output = format!(
            "\n{} {} {}\n  context {:.2} | performance {:.2} | trend {:.2}\n",
            format!("{}.", rank).cyan().bold(),
            entry.flow_type.display_name().bold(),
            format!("{:.3}", entry.score).yellow(),
            entry.context_score,
            entry.performance_score,
            entry.trend_score
        );
        for reason in &entry.reasons {
            output.push_str(&format!("  * {}\n", reason));
        }
        output
    }

    fn urgency(urgency: SwitchUrgency) -> String {
        let label = urgency.to_string();
        match urgency {
            SwitchUrgency::None => label.green().to_string(),
            SwitchUrgency::Low => label.yellow().to_string(),
            SwitchUrgency::Medium | SwitchUrgency::High => label.red().bold().to_string(),
        }
    }

    fn confidence(confidence: Option<f64>) -> String {
        confidence
            .map(|c| format!("{:.1}", c))
            .unwrap_or_else(|| "n/a".to_string())
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}
