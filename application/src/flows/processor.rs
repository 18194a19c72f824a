//! Flow processor contract.
//!
//! A processor implements one [`AgenticFlowType`] protocol over the service
//! ports. Implementors write [`FlowProcessor::execute`]; callers use the
//! provided [`FlowProcessor::process`], which never fails: configuration
//! errors, service errors, timeouts and panics inside `execute` all become a
//! FAILED [`AgenticFlowResult`].

use crate::ports::service_error::ServiceError;
use async_trait::async_trait;
use flow_domain::{AgenticFlowConfiguration, AgenticFlowResult, AgenticFlowType, PromptContext};
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors raised inside a flow protocol
#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid configuration for {0}")]
    InvalidConfiguration(AgenticFlowType),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Malformed model output: {0}")]
    MalformedResponse(String),

    #[error("All {0} ensemble candidates failed")]
    AllCandidatesFailed(usize),

    #[error("Processor panicked: {0}")]
    Panicked(String),
}

/// Run one port call under `timeout`
pub async fn bounded<T>(
    timeout: Duration,
    call: impl Future<Output = Result<T, ServiceError>>,
) -> Result<T, FlowError> {
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result.map_err(FlowError::from),
        Err(_) => Err(FlowError::Timeout(timeout)),
    }
}

/// One agentic flow strategy
#[async_trait]
pub trait FlowProcessor: Send + Sync {
    fn flow_type(&self) -> AgenticFlowType;

    /// Pure type/range check. The empty configuration is always valid.
    fn validate_configuration(&self, configuration: &AgenticFlowConfiguration) -> bool;

    /// Run the protocol; errors are converted by [`process`](Self::process).
    async fn execute(
        &self,
        prompt: &str,
        configuration: &AgenticFlowConfiguration,
        context: &PromptContext,
    ) -> Result<AgenticFlowResult, FlowError>;

    /// The FAILED result returned for `error`
    fn failure_result(&self, prompt: &str, error: &FlowError) -> AgenticFlowResult {
        let name = self.flow_type().display_name();
        AgenticFlowResult::failure(
            prompt,
            format!("An error occurred during {}: {}", name, error),
            format!("{} processing failure: {}", name, error),
        )
    }

    /// Run the protocol, containing every failure in the result
    async fn process(
        &self,
        prompt: &str,
        configuration: &AgenticFlowConfiguration,
        context: &PromptContext,
    ) -> AgenticFlowResult {
        let flow_type = self.flow_type();
        info!(
            "Running {} for debate {} / participant {}",
            flow_type,
            context.debate_id(),
            context.participant_id()
        );

        if !self.validate_configuration(configuration) {
            let error = FlowError::InvalidConfiguration(flow_type);
            warn!("{}", error);
            return self.failure_result(prompt, &error);
        }

        let outcome = AssertUnwindSafe(self.execute(prompt, configuration, context))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(result)) => {
                debug!(
                    "{} finished with {} steps ({})",
                    flow_type,
                    result.processing_steps().len(),
                    result.status()
                );
                result
            }
            Ok(Err(error)) => {
                warn!("{} failed: {}", flow_type, error);
                self.failure_result(prompt, &error)
            }
            Err(payload) => {
                let error = FlowError::Panicked(panic_message(payload.as_ref()));
                warn!("{} panicked: {}", flow_type, error);
                self.failure_result(prompt, &error)
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PanickingProcessor;

    #[async_trait]
    impl FlowProcessor for PanickingProcessor {
        fn flow_type(&self) -> AgenticFlowType {
            AgenticFlowType::PromptChaining
        }

        fn validate_configuration(&self, configuration: &AgenticFlowConfiguration) -> bool {
            configuration.is_optional_bool("explode")
        }

        async fn execute(
            &self,
            _prompt: &str,
            configuration: &AgenticFlowConfiguration,
            _context: &PromptContext,
        ) -> Result<AgenticFlowResult, FlowError> {
            if configuration.get_bool("explode").unwrap_or(true) {
                panic!("boom");
            }
            Err(FlowError::MalformedResponse("nothing usable".to_string()))
        }
    }

    fn context() -> PromptContext {
        PromptContext::new("debate-1", "participant-1")
    }

    #[tokio::test]
    async fn test_panic_becomes_failed_result() {
        let result = PanickingProcessor
            .process("prompt", &AgenticFlowConfiguration::new(), &context())
            .await;
        assert!(result.is_error());
        assert!(result.final_response().contains("boom"));
        assert!(!result.response_changed());
    }

    #[tokio::test]
    async fn test_error_becomes_failed_result() {
        let configuration = AgenticFlowConfiguration::new().with_parameter("explode", false);
        let result = PanickingProcessor
            .process("prompt", &configuration, &context())
            .await;
        assert!(result.is_error());
        assert!(result.reasoning().contains("nothing usable"));
    }

    #[tokio::test]
    async fn test_invalid_configuration_becomes_failed_result() {
        let configuration = AgenticFlowConfiguration::new().with_parameter("explode", "yes");
        let result = PanickingProcessor
            .process("prompt", &configuration, &context())
            .await;
        assert!(result.is_error());
        assert!(result.final_response().contains("Invalid configuration"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_times_out() {
        let outcome: Result<(), FlowError> = bounded(
            Duration::from_secs(1),
            std::future::pending::<Result<(), ServiceError>>(),
        )
        .await;
        assert!(matches!(outcome, Err(FlowError::Timeout(_))));
    }
}
