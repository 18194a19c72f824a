//! Analytics configuration from TOML (`[analytics]` section)
//!
//! ```toml
//! [analytics]
//! max_concurrent_tasks = 8   # worker pool size
//! task_deadline_secs = 10    # per-task join deadline
//! trend_window_days = 30     # trailing window for trends
//! ```

use super::{
    ConfigValidationError, MAX_CONCURRENT_TASKS, MAX_DEADLINE_SECS, MAX_WINDOW_DAYS, check_range,
};
use flow_application::AnalyticsSettings;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw analytics worker pool configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAnalyticsConfig {
    pub max_concurrent_tasks: usize,
    pub task_deadline_secs: u64,
    pub trend_window_days: u32,
}

impl Default for FileAnalyticsConfig {
    fn default() -> Self {
        let defaults = AnalyticsSettings::default();
        Self {
            max_concurrent_tasks: defaults.max_concurrent_tasks,
            task_deadline_secs: defaults.task_deadline.as_secs(),
            trend_window_days: defaults.trend_window_days,
        }
    }
}

impl FileAnalyticsConfig {
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut issues = Vec::new();
        check_range(
            "analytics.max_concurrent_tasks",
            self.max_concurrent_tasks as u64,
            MAX_CONCURRENT_TASKS as u64,
            &mut issues,
        );
        check_range(
            "analytics.task_deadline_secs",
            self.task_deadline_secs,
            MAX_DEADLINE_SECS,
            &mut issues,
        );
        check_range(
            "analytics.trend_window_days",
            u64::from(self.trend_window_days),
            u64::from(MAX_WINDOW_DAYS),
            &mut issues,
        );
        issues
    }

    pub fn to_settings(&self) -> AnalyticsSettings {
        AnalyticsSettings::default()
            .with_max_concurrent_tasks(self.max_concurrent_tasks)
            .with_task_deadline(Duration::from_secs(self.task_deadline_secs))
            .with_trend_window_days(self.trend_window_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analytics_config_default_matches_settings() {
        let config = FileAnalyticsConfig::default();
        assert_eq!(config.to_settings(), AnalyticsSettings::default());
    }

    #[test]
    fn test_zero_deadline_rejected() {
        let config = FileAnalyticsConfig {
            task_deadline_secs: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            vec![ConfigValidationError::ZeroValue("analytics.task_deadline_secs")]
        );
    }

    #[test]
    fn test_oversized_values_rejected() {
        let config = FileAnalyticsConfig {
            max_concurrent_tasks: usize::MAX,
            task_deadline_secs: u64::MAX,
            trend_window_days: u32::MAX,
        };
        assert_eq!(
            config.validate(),
            vec![
                ConfigValidationError::TooLarge {
                    field: "analytics.max_concurrent_tasks",
                    max: 1_024,
                },
                ConfigValidationError::TooLarge {
                    field: "analytics.task_deadline_secs",
                    max: 86_400,
                },
                ConfigValidationError::TooLarge {
                    field: "analytics.trend_window_days",
                    max: 3_650,
                },
            ]
        );
    }
}
