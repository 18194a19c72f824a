//! Retrieved document value object (RAG).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A document returned by the retrieval service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub content: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub relevance_score: f64,
}

impl Document {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            source: source.into(),
            timestamp: None,
            relevance_score: 0.0,
        }
    }

    pub fn with_relevance_score(mut self, score: f64) -> Self {
        self.relevance_score = score;
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Content truncated to at most `max_chars` characters
    pub fn excerpt(&self, max_chars: usize) -> String {
        if self.content.chars().count() <= max_chars {
            return self.content.clone();
        }
        let mut excerpt: String = self.content.chars().take(max_chars).collect();
        excerpt.push_str("...");
        excerpt
    }
}
