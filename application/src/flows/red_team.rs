//! Multi-Agent Red Team: Architect proposes, Skeptic critiques, Judge decides.

use crate::flows::processor::{FlowError, FlowProcessor};
use crate::flows::services::{BoundedLlm, FlowServices};
use async_trait::async_trait;
use flow_domain::flow::parsing::judge_verdict;
use flow_domain::flow::result::METRIC_VISUALIZATION_TYPE;
use flow_domain::{
    AgenticFlowConfiguration, AgenticFlowResult, AgenticFlowType, FlowPromptTemplate,
    ProcessingStep, PromptContext,
};

pub const STEP_ARCHITECT: &str = "multi_agent_red_team_architect";
pub const STEP_SKEPTIC: &str = "multi_agent_red_team_skeptic";
pub const STEP_JUDGE: &str = "multi_agent_red_team_judge";

const PERSONA_OVERRIDES: [&str; 3] = ["architect_prompt", "skeptic_prompt", "judge_prompt"];

pub struct RedTeamProcessor {
    llm: BoundedLlm,
}

impl RedTeamProcessor {
    pub fn new(services: &FlowServices) -> Self {
        Self {
            llm: services.bounded_llm(),
        }
    }
}

#[async_trait]
impl FlowProcessor for RedTeamProcessor {
    fn flow_type(&self) -> AgenticFlowType {
        AgenticFlowType::MultiAgentRedTeam
    }

    fn validate_configuration(&self, configuration: &AgenticFlowConfiguration) -> bool {
        PERSONA_OVERRIDES
            .iter()
            .all(|name| configuration.is_optional_string(name))
    }

    async fn execute(
        &self,
        prompt: &str,
        configuration: &AgenticFlowConfiguration,
        _context: &PromptContext,
    ) -> Result<AgenticFlowResult, FlowError> {
        let architect_instruction = configuration
            .get_str("architect_prompt")
            .unwrap_or(FlowPromptTemplate::architect_instruction());
        let skeptic_instruction = configuration
            .get_str("skeptic_prompt")
            .unwrap_or(FlowPromptTemplate::skeptic_instruction());
        let judge_instruction = configuration
            .get_str("judge_prompt")
            .unwrap_or(FlowPromptTemplate::judge_instruction());

        let architect = self
            .llm
            .generate(&FlowPromptTemplate::architect_prompt(architect_instruction, prompt))
            .await?
            .text;
        let skeptic = self
            .llm
            .generate(&FlowPromptTemplate::skeptic_prompt(
                skeptic_instruction,
                prompt,
                &architect,
            ))
            .await?
            .text;
        let judge_prompt =
            FlowPromptTemplate::judge_prompt(judge_instruction, prompt, &architect, &skeptic);
        let judge = self.llm.generate(&judge_prompt).await?.text;

        let verdict = judge_verdict(&judge);

        Ok(AgenticFlowResult::builder(prompt)
            .enhanced_prompt(judge_prompt)
            .full_response(judge.clone())
            .final_response(judge.clone())
            .reasoning(format!(
                "Architect:\n{}\n\nSkeptic:\n{}",
                architect, skeptic
            ))
            .step(ProcessingStep::new(STEP_ARCHITECT, architect).with_metadata("persona", "architect"))
            .step(ProcessingStep::new(STEP_SKEPTIC, skeptic).with_metadata("persona", "skeptic"))
            .step(ProcessingStep::new(STEP_JUDGE, judge).with_metadata("persona", "judge"))
            .metric("persona_count", 3)
            .metric("judge_agrees_with_architect", verdict.agrees_with_architect)
            .metric("judge_agrees_with_skeptic", verdict.agrees_with_skeptic)
            .metric(METRIC_VISUALIZATION_TYPE, "multi_agent_red_team")
            .response_changed(true)
            .build())
    }
}
