//! Prompt context passed to every processor invocation.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Immutable description of who is speaking in which debate.
///
/// A context may be forked across concurrent strategy invocations, so
/// [`with_context_data`](Self::with_context_data) always returns a new
/// instance and leaves the receiver untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptContext {
    debate_id: String,
    participant_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    organization_id: Option<String>,
    #[serde(default)]
    context_data: Arc<BTreeMap<String, Value>>,
}

impl PromptContext {
    pub fn new(debate_id: impl Into<String>, participant_id: impl Into<String>) -> Self {
        Self {
            debate_id: debate_id.into(),
            participant_id: participant_id.into(),
            organization_id: None,
            context_data: Arc::new(BTreeMap::new()),
        }
    }

    pub fn with_organization(mut self, organization_id: impl Into<String>) -> Self {
        self.organization_id = Some(organization_id.into());
        self
    }

    /// Return a new context carrying one more data entry
    pub fn with_context_data(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut data = (*self.context_data).clone();
        data.insert(key.into(), value.into());
        Self {
            debate_id: self.debate_id.clone(),
            participant_id: self.participant_id.clone(),
            organization_id: self.organization_id.clone(),
            context_data: Arc::new(data),
        }
    }

    pub fn debate_id(&self) -> &str {
        &self.debate_id
    }

    pub fn participant_id(&self) -> &str {
        &self.participant_id
    }

    pub fn organization_id(&self) -> Option<&str> {
        self.organization_id.as_deref()
    }

    pub fn context_data(&self) -> &BTreeMap<String, Value> {
        &self.context_data
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.context_data.get(key)
    }
}
