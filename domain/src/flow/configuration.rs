//! Flow configuration value object.
//!
//! [`AgenticFlowConfiguration`] is an immutable parameter map shared behind an
//! `Arc`. Updating it produces a new configuration, so one instance can be
//! handed to many concurrent processor invocations without locking.
//!
//! The `is_optional_*` helpers are the building blocks processors use in
//! `validate_configuration`: each one accepts a missing key, rejects
//! `null`, and never panics.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Immutable mapping of parameter name → JSON value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgenticFlowConfiguration {
    parameters: Arc<BTreeMap<String, Value>>,
}

impl AgenticFlowConfiguration {
    /// Empty configuration: every strategy falls back to its defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON value; only objects are accepted.
    pub fn from_json(value: Value) -> Result<Self, DomainError> {
        match value {
            Value::Object(map) => Ok(Self {
                parameters: Arc::new(map.into_iter().collect()),
            }),
            Value::Null => Ok(Self::default()),
            other => Err(DomainError::InvalidConfiguration(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Return a copy with one parameter set (copy-on-write)
    pub fn with_parameter(&self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut parameters = (*self.parameters).clone();
        parameters.insert(name.into(), value.into());
        Self {
            parameters: Arc::new(parameters),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.parameters.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name)
    }

    pub fn parameters(&self) -> &BTreeMap<String, Value> {
        &self.parameters
    }

    // ==================== Typed accessors ====================

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn get_u64(&self, name: &str) -> Option<u64> {
        self.get(name).and_then(Value::as_u64)
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    /// String entries of a list parameter (non-string entries are skipped)
    pub fn get_str_list(&self, name: &str) -> Option<Vec<String>> {
        self.get(name).and_then(Value::as_array).map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
    }

    // ==================== Validation helpers ====================

    pub fn is_optional_string(&self, name: &str) -> bool {
        self.get(name).is_none_or(Value::is_string)
    }

    pub fn is_optional_bool(&self, name: &str) -> bool {
        self.get(name).is_none_or(Value::is_boolean)
    }

    pub fn is_optional_list(&self, name: &str) -> bool {
        self.get(name).is_none_or(Value::is_array)
    }

    pub fn is_optional_string_list(&self, name: &str) -> bool {
        self.get(name).is_none_or(|v| {
            v.as_array()
                .is_some_and(|items| items.iter().all(Value::is_string))
        })
    }

    /// Integer (no fractional part) within `min..=max`
    pub fn is_optional_integer_in(&self, name: &str, min: u64, max: u64) -> bool {
        self.get(name)
            .is_none_or(|v| v.as_u64().is_some_and(|n| (min..=max).contains(&n)))
    }

    /// Any finite number within `min..=max`
    pub fn is_optional_number_in(&self, name: &str, min: f64, max: f64) -> bool {
        self.get(name).is_none_or(|v| {
            v.as_f64()
                .is_some_and(|n| n.is_finite() && n >= min && n <= max)
        })
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
