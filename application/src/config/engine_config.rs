//! Engine configuration: timeouts, worker pool and scoring weights.
//!
//! [`EngineConfig`] groups the runtime parameters of the flow processors,
//! the analytics service and the recommendation service. These are
//! application-layer concerns; the infrastructure layer builds them from
//! the config file.

use flow_domain::RecommendationWeights;
use std::time::Duration;

/// Per-call limits shared by every flow processor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessorSettings {
    /// Upper bound on each LLM, RAG or tool call.
    pub call_timeout: Duration,
}

impl Default for ProcessorSettings {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(60),
        }
    }
}

impl ProcessorSettings {
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }
}

/// Analytics worker pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyticsSettings {
    /// Maximum number of analytics tasks running at once.
    pub max_concurrent_tasks: usize,
    /// Deadline for joining a single analytics task.
    pub task_deadline: Duration,
    /// Trailing window used for trends and history.
    pub trend_window_days: u32,
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            max_concurrent_tasks: 8,
            task_deadline: Duration::from_secs(10),
            trend_window_days: 30,
        }
    }
}

impl AnalyticsSettings {
    pub fn with_max_concurrent_tasks(mut self, max: usize) -> Self {
        self.max_concurrent_tasks = max;
        self
    }

    pub fn with_task_deadline(mut self, deadline: Duration) -> Self {
        self.task_deadline = deadline;
        self
    }

    pub fn with_trend_window_days(mut self, days: u32) -> Self {
        self.trend_window_days = days;
        self
    }
}

/// Recommendation scoring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommendationSettings {
    pub weights: RecommendationWeights,
    /// Overall deadline for `compare_flow_types`.
    pub comparison_deadline: Duration,
    /// Trailing window of history considered when scoring.
    pub history_window_days: u32,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            weights: RecommendationWeights::default(),
            comparison_deadline: Duration::from_secs(15),
            history_window_days: 30,
        }
    }
}

impl RecommendationSettings {
    pub fn with_weights(mut self, weights: RecommendationWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_comparison_deadline(mut self, deadline: Duration) -> Self {
        self.comparison_deadline = deadline;
        self
    }

    pub fn with_history_window_days(mut self, days: u32) -> Self {
        self.history_window_days = days;
        self
    }
}

/// Everything the application layer needs at runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EngineConfig {
    pub processor: ProcessorSettings,
    pub analytics: AnalyticsSettings,
    pub recommendation: RecommendationSettings,
}
