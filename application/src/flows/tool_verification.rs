//! Tool-Calling Verification: answer, run at most one requested tool, revise.

use crate::config::ProcessorSettings;
use crate::flows::processor::{FlowError, FlowProcessor, bounded};
use crate::flows::services::{BoundedLlm, FlowServices};
use crate::ports::external_tool::ExternalToolPort;
use async_trait::async_trait;
use flow_domain::flow::parsing::extract_tool_call;
use flow_domain::flow::result::METRIC_VISUALIZATION_TYPE;
use flow_domain::{
    AgenticFlowConfiguration, AgenticFlowResult, AgenticFlowType, FlowPromptTemplate,
    ProcessingStep, PromptContext, ToolDefinition,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub const STEP_INITIAL_RESPONSE: &str = "initial_response";
pub const STEP_TOOL_CALL: &str = "tool_call";
pub const STEP_REVISED_RESPONSE: &str = "revised_response";

const VISUALIZATION: &str = "tool_calling_verification";

pub struct ToolVerificationProcessor {
    llm: BoundedLlm,
    tools: Vec<Arc<dyn ExternalToolPort>>,
    tool_timeout: Duration,
}

impl ToolVerificationProcessor {
    pub fn new(services: &FlowServices) -> Self {
        Self::with_tools(services.bounded_llm(), services.tools.clone(), &services.settings)
    }

    pub fn with_tools(
        llm: BoundedLlm,
        tools: Vec<Arc<dyn ExternalToolPort>>,
        settings: &ProcessorSettings,
    ) -> Self {
        Self {
            llm,
            tools,
            tool_timeout: settings.call_timeout,
        }
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.tool_name()).collect()
    }

    /// Registered tools, restricted to the configured `tools` list if present
    fn offered_tools(&self, configuration: &AgenticFlowConfiguration) -> Vec<&Arc<dyn ExternalToolPort>> {
        match configuration.get_str_list("tools") {
            Some(allowed) => self
                .tools
                .iter()
                .filter(|t| allowed.iter().any(|name| name == t.tool_name()))
                .collect(),
            None => self.tools.iter().collect(),
        }
    }
}

#[async_trait]
impl FlowProcessor for ToolVerificationProcessor {
    fn flow_type(&self) -> AgenticFlowType {
        AgenticFlowType::ToolCallingVerification
    }

    fn validate_configuration(&self, configuration: &AgenticFlowConfiguration) -> bool {
        configuration.is_optional_string_list("tools")
    }

    async fn execute(
        &self,
        prompt: &str,
        configuration: &AgenticFlowConfiguration,
        _context: &PromptContext,
    ) -> Result<AgenticFlowResult, FlowError> {
        let offered = self.offered_tools(configuration);
        let definitions: Vec<ToolDefinition> = offered.iter().map(|t| t.definition()).collect();
        let enhanced_prompt = FlowPromptTemplate::tool_verification_prompt(prompt);

        // Step 1: initial answer with tools attached
        let initial = self
            .llm
            .generate_with_tool_calling(&enhanced_prompt, &definitions)
            .await?
            .text;
        let initial_step = ProcessingStep::new(STEP_INITIAL_RESPONSE, initial.clone())
            .with_metadata("tools_offered", definitions.len());

        let call = extract_tool_call(&initial, |name| {
            offered.iter().any(|t| t.tool_name() == name)
        });

        let Some(call) = call else {
            debug!("No tool call requested");
            return Ok(AgenticFlowResult::builder(prompt)
                .enhanced_prompt(enhanced_prompt)
                .full_response(initial.clone())
                .final_response(initial)
                .step(initial_step)
                .metric("tool_calls", 0)
                .metric("tools_available", definitions.len())
                .metric(METRIC_VISUALIZATION_TYPE, VISUALIZATION)
                .response_changed(false)
                .build());
        };

        // Step 2: dispatch to the exactly matching adapter, once
        let tool = offered
            .iter()
            .find(|t| t.tool_name() == call.tool)
            .ok_or_else(|| FlowError::UnknownTool(call.tool.clone()))?;
        info!("Executing tool {}", call.tool);
        let tool_result = bounded(self.tool_timeout, tool.execute_tool_call(&call)).await?;
        let tool_result_json = serde_json::to_string_pretty(&tool_result)
            .unwrap_or_else(|_| tool_result.result.to_string());
        let tool_step = ProcessingStep::new(STEP_TOOL_CALL, tool_result_json.clone())
            .with_metadata("tool", call.tool.clone())
            .with_metadata("parameters", call.parameters.clone())
            .with_metadata("success", tool_result.success);

        // Step 3: revise with the tool result folded in
        let revision_prompt =
            FlowPromptTemplate::tool_revision_prompt(prompt, &initial, &tool_result_json);
        let revised = self.llm.generate(&revision_prompt).await?.text;

        Ok(AgenticFlowResult::builder(prompt)
            .enhanced_prompt(enhanced_prompt)
            .full_response(initial)
            .final_response(revised.clone())
            .reasoning(format!("Verified with tool '{}'", call.tool))
            .step(initial_step)
            .step(tool_step)
            .step(ProcessingStep::new(STEP_REVISED_RESPONSE, revised))
            .metric("tool_calls", 1)
            .metric("tools_available", definitions.len())
            .metric("tool_name", call.tool)
            .metric("tool_success", tool_result.success)
            .metric(METRIC_VISUALIZATION_TYPE, VISUALIZATION)
            .response_changed(true)
            .build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flows::test_support::{RecordingTool, Scripted, ScriptedLlm, context, services};
    use serde_json::json;

    fn processor(llm: Arc<ScriptedLlm>, tools: Vec<Arc<RecordingTool>>) -> ToolVerificationProcessor {
        let mut services = services(llm);
        for tool in tools {
            services = services.with_tool(tool);
        }
        ToolVerificationProcessor::new(&services)
    }

    #[tokio::test]
    async fn test_no_tool_call_single_step() {
        let search = Arc::new(RecordingTool::new("web_search", json!({"hits": 1})));
        let llm = Arc::new(ScriptedLlm::texts(&["Water boils at 100C at sea level."]));
        let processor = processor(llm.clone(), vec![search.clone()]);

        let result = processor
            .process("Boiling point?", &AgenticFlowConfiguration::new(), &context())
            .await;

        assert_eq!(result.step_types(), vec![STEP_INITIAL_RESPONSE]);
        assert!(!result.response_changed());
        assert!(search.calls().is_empty());
        assert_eq!(llm.offered_tools(), vec![vec!["web_search".to_string()]]);
    }

    #[tokio::test]
    async fn test_embedded_tool_call_runs_tool_once() {
        let search = Arc::new(RecordingTool::new("web_search", json!({"answer": "100C"})));
        let other = Arc::new(RecordingTool::new("calculator", json!(0)));
        let llm = Arc::new(ScriptedLlm::texts(&[
            r#"Let me check. {"tool": "web_search", "parameters": {"query": "boiling point"}} and maybe {"tool": "calculator", "parameters": {}}"#,
            "Confirmed: 100C.",
        ]));
        let processor = processor(llm.clone(), vec![search.clone(), other.clone()]);

        let result = processor
            .process("Boiling point?", &AgenticFlowConfiguration::new(), &context())
            .await;

        assert_eq!(
            result.step_types(),
            vec![STEP_INITIAL_RESPONSE, STEP_TOOL_CALL, STEP_REVISED_RESPONSE]
        );
        let calls = search.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].parameters, json!({"query": "boiling point"}));
        assert!(other.calls().is_empty());
        assert_eq!(result.final_response(), "Confirmed: 100C.");
        assert!(result.full_response().starts_with("Let me check."));
        assert!(result.response_changed());
        assert!(llm.prompts()[1].contains("100C"));
    }

    #[tokio::test]
    async fn test_unregistered_tool_is_ignored() {
        let search = Arc::new(RecordingTool::new("web_search", json!(null)));
        let llm = Arc::new(ScriptedLlm::texts(&[r#"{"tool": "shell", "parameters": {"cmd": "ls"}}"#]));
        let processor = processor(llm, vec![search.clone()]);

        let result = processor
            .process("Q", &AgenticFlowConfiguration::new(), &context())
            .await;

        assert_eq!(result.processing_steps().len(), 1);
        assert!(search.calls().is_empty());
    }

    #[tokio::test]
    async fn test_tools_list_restricts_offer() {
        let search = Arc::new(RecordingTool::new("web_search", json!(null)));
        let calc = Arc::new(RecordingTool::new("calculator", json!(4)));
        let llm = Arc::new(ScriptedLlm::texts(&[r#"{"tool": "web_search", "parameters": {}}"#]));
        let processor = processor(llm.clone(), vec![search.clone(), calc]);
        let configuration =
            AgenticFlowConfiguration::new().with_parameter("tools", json!(["calculator"]));

        let result = processor.process("Q", &configuration, &context()).await;

        assert_eq!(llm.offered_tools(), vec![vec!["calculator".to_string()]]);
        assert!(search.calls().is_empty());
        assert!(!result.response_changed());
    }

    #[tokio::test]
    async fn test_tool_failure_is_contained() {
        let search = Arc::new(RecordingTool::failing("web_search", "503"));
        let llm = Arc::new(ScriptedLlm::new(vec![Scripted::text(
            r#"{"name": "web_search", "arguments": "{\"query\": \"x\"}"}"#,
        )]));
        let processor = processor(llm, vec![search.clone()]);

        let result = processor
            .process("Q", &AgenticFlowConfiguration::new(), &context())
            .await;

        assert!(result.is_error());
        assert_eq!(search.calls()[0].parameters, json!({"query": "x"}));
    }

    #[test]
    fn test_validate_configuration() {
        let processor = processor(Arc::new(ScriptedLlm::texts(&[])), vec![]);
        assert!(processor.validate_configuration(&AgenticFlowConfiguration::new()));
        assert!(processor.validate_configuration(
            &AgenticFlowConfiguration::new().with_parameter("tools", json!(["web_search"]))
        ));
        assert!(!processor.validate_configuration(
            &AgenticFlowConfiguration::new().with_parameter("tools", "web_search")
        ));
    }
}
