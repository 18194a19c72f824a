//! Recommendation configuration from TOML (`[recommendation]` section)
//!
//! ```toml
//! [recommendation]
//! comparison_deadline_secs = 15
//! history_window_days = 30
//!
//! [recommendation.weights]
//! context = 0.45
//! performance = 0.35
//! trend = 0.20
//! ```

use super::{ConfigValidationError, MAX_DEADLINE_SECS, MAX_WINDOW_DAYS, check_range};
use flow_application::RecommendationSettings;
use flow_domain::RecommendationWeights;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw scoring weights; normalized before use
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileWeightsConfig {
    pub context: f64,
    pub performance: f64,
    pub trend: f64,
}

impl Default for FileWeightsConfig {
    fn default() -> Self {
        let weights = RecommendationWeights::default();
        Self {
            context: weights.context,
            performance: weights.performance,
            trend: weights.trend,
        }
    }
}

impl FileWeightsConfig {
    pub fn is_valid(&self) -> bool {
        let parts = [self.context, self.performance, self.trend];
        parts.iter().all(|w| w.is_finite() && *w >= 0.0) && parts.iter().sum::<f64>() > 0.0
    }

    pub fn to_weights(&self) -> RecommendationWeights {
        RecommendationWeights {
            context: self.context,
            performance: self.performance,
            trend: self.trend,
        }
    }
}

/// Raw recommendation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRecommendationConfig {
    pub weights: FileWeightsConfig,
    pub comparison_deadline_secs: u64,
    pub history_window_days: u32,
}

impl Default for FileRecommendationConfig {
    fn default() -> Self {
        let defaults = RecommendationSettings::default();
        Self {
            weights: FileWeightsConfig::default(),
            comparison_deadline_secs: defaults.comparison_deadline.as_secs(),
            history_window_days: defaults.history_window_days,
        }
    }
}

impl FileRecommendationConfig {
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut issues = Vec::new();
        if !self.weights.is_valid() {
            issues.push(ConfigValidationError::InvalidWeights);
        }
        check_range(
            "recommendation.comparison_deadline_secs",
            self.comparison_deadline_secs,
            MAX_DEADLINE_SECS,
            &mut issues,
        );
        check_range(
            "recommendation.history_window_days",
            u64::from(self.history_window_days),
            u64::from(MAX_WINDOW_DAYS),
            &mut issues,
        );
        issues
    }

    pub fn to_settings(&self) -> RecommendationSettings {
        RecommendationSettings::default()
            .with_weights(self.weights.to_weights())
            .with_comparison_deadline(Duration::from_secs(self.comparison_deadline_secs))
            .with_history_window_days(self.history_window_days)
    }
}
