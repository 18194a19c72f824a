//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Unknown flow type: {0}")]
    UnknownFlowType(String),

    #[error("Invalid context: {0}")]
    InvalidContext(String),
}

impl DomainError {
    /// Check if this error was caused by malformed flow parameters
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, DomainError::InvalidConfiguration(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_flow_type_display() {
        let error = DomainError::UnknownFlowType("MAGIC".to_string());
        assert_eq!(error.to_string(), "Unknown flow type: MAGIC");
    }

    #[test]
    fn test_is_configuration_error() {
        assert!(DomainError::InvalidConfiguration("x".to_string()).is_configuration_error());
        assert!(!DomainError::UnknownFlowType("x".to_string()).is_configuration_error());
    }
}
