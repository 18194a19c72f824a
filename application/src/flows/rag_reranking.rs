//! RAG with Re-ranking: retrieve, let the model re-rank, answer with citations.

use crate::flows::processor::{FlowError, FlowProcessor};
use crate::flows::services::{BoundedLlm, BoundedRag, FlowServices};
use async_trait::async_trait;
use flow_domain::flow::parsing::{count_citations, parse_ranking};
use flow_domain::flow::result::METRIC_VISUALIZATION_TYPE;
use flow_domain::{
    AgenticFlowConfiguration, AgenticFlowResult, AgenticFlowType, Document, FlowPromptTemplate,
    ProcessingStep, PromptContext,
};
use tracing::debug;

pub const STEP_INITIAL_RETRIEVAL: &str = "initial_retrieval";
pub const STEP_DOCUMENT_RERANKING: &str = "document_reranking";
pub const STEP_RESPONSE_GENERATION: &str = "response_generation";

const DEFAULT_INITIAL_RETRIEVAL_COUNT: u64 = 10;
const DEFAULT_FINAL_DOCUMENT_COUNT: u64 = 3;
const DEFAULT_RERANKING_CRITERIA: &str = "relevance to the question";
const VISUALIZATION: &str = "rag_reranking";

pub struct RagRerankingProcessor {
    llm: BoundedLlm,
    rag: BoundedRag,
}

impl RagRerankingProcessor {
    pub fn new(services: &FlowServices) -> Self {
        Self {
            llm: services.bounded_llm(),
            rag: services.bounded_rag(),
        }
    }
}

fn document_list(documents: &[Document]) -> String {
    documents
        .iter()
        .enumerate()
        .map(|(i, doc)| format!("{}. {} ({})", i + 1, doc.title, doc.source))
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl FlowProcessor for RagRerankingProcessor {
    fn flow_type(&self) -> AgenticFlowType {
        AgenticFlowType::RagWithReranking
    }

    fn validate_configuration(&self, configuration: &AgenticFlowConfiguration) -> bool {
        configuration.is_optional_integer_in("initial_retrieval_count", 1, 100)
            && configuration.is_optional_integer_in("final_document_count", 1, u64::MAX)
            && configuration.is_optional_string("reranking_criteria")
    }

    fn failure_result(&self, prompt: &str, error: &FlowError) -> AgenticFlowResult {
        AgenticFlowResult::failure(
            prompt,
            format!("An error occurred during document re-ranking: {}", error),
            format!("RAG re-ranking processing failure: {}", error),
        )
    }

    async fn execute(
        &self,
        prompt: &str,
        configuration: &AgenticFlowConfiguration,
        _context: &PromptContext,
    ) -> Result<AgenticFlowResult, FlowError> {
        let initial_count = configuration
            .get_u64("initial_retrieval_count")
            .unwrap_or(DEFAULT_INITIAL_RETRIEVAL_COUNT) as usize;
        let final_count = configuration
            .get_u64("final_document_count")
            .unwrap_or(DEFAULT_FINAL_DOCUMENT_COUNT) as usize;
        let criteria = configuration
            .get_str("reranking_criteria")
            .unwrap_or(DEFAULT_RERANKING_CRITERIA);

        // Step 1: retrieval
        let documents = self.rag.retrieve_documents(prompt, initial_count).await?;
        let retrieval_step = ProcessingStep::new(STEP_INITIAL_RETRIEVAL, document_list(&documents))
            .with_metadata("document_count", documents.len());

        if documents.is_empty() {
            let message = "No relevant documents were found for this question.";
            return Ok(AgenticFlowResult::builder(prompt)
                .full_response(message)
                .final_response(message)
                .step(retrieval_step)
                .metric("initial_documents", 0)
                .metric("reranked_documents", 0)
                .metric("citations_count", 0)
                .metric(METRIC_VISUALIZATION_TYPE, VISUALIZATION)
                .response_changed(false)
                .build());
        }

        // Step 2: re-ranking
        let ranking_response = self
            .llm
            .generate(&FlowPromptTemplate::rerank_prompt(prompt, &documents, criteria))
            .await?;
        let parsed = parse_ranking(&ranking_response.text, documents.len());
        let used_fallback = parsed.is_none();
        if used_fallback {
            debug!("Unparseable ranking; keeping retrieval order");
        }
        let order = parsed.unwrap_or_else(|| (0..documents.len()).collect());
        let reranked: Vec<Document> = order.iter().map(|&i| documents[i].clone()).collect();
        let ranking_step = ProcessingStep::new(STEP_DOCUMENT_RERANKING, ranking_response.text)
            .with_metadata(
                "ranking",
                order.iter().map(|i| i + 1).collect::<Vec<_>>(),
            )
            .with_metadata("fallback_order", used_fallback);

        // Step 3: answer with citations
        let selected = &reranked[..final_count.min(reranked.len())];
        let enhanced_prompt = FlowPromptTemplate::rag_answer_prompt(prompt, selected);
        let answer = self.llm.generate(&enhanced_prompt).await?;
        let citations = count_citations(&answer.text);

        Ok(AgenticFlowResult::builder(prompt)
            .enhanced_prompt(enhanced_prompt)
            .full_response(answer.text.clone())
            .final_response(answer.text.clone())
            .reasoning(format!(
                "Answer grounded in {} of {} retrieved documents:\n{}",
                selected.len(),
                documents.len(),
                document_list(selected)
            ))
            .step(retrieval_step)
            .step(ranking_step)
            .step(
                ProcessingStep::new(STEP_RESPONSE_GENERATION, answer.text)
                    .with_metadata("document_count", selected.len()),
            )
            .metric("initial_documents", documents.len())
            .metric("reranked_documents", reranked.len())
            .metric("final_documents", selected.len())
            .metric("citations_count", citations)
            .metric(METRIC_VISUALIZATION_TYPE, VISUALIZATION)
            .response_changed(true)
            .build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flows::test_support::{ScriptedLlm, ScriptedRag, context};
    use serde_json::json;
    use std::sync::Arc;

    fn documents(n: usize) -> Vec<Document> {
        (1..=n)
            .map(|i| Document::new(format!("d{}", i), format!("Doc {}", i), format!("content {}", i), "wiki"))
            .collect()
    }

    fn processor(llm: Arc<ScriptedLlm>, rag: Arc<ScriptedRag>) -> RagRerankingProcessor {
        RagRerankingProcessor::new(&FlowServices::new(llm, rag))
    }

    #[tokio::test]
    async fn test_no_documents_short_circuits() {
        let llm = Arc::new(ScriptedLlm::texts(&[]));
        let processor = processor(llm.clone(), Arc::new(ScriptedRag::empty()));

        let result = processor
            .process("Q", &AgenticFlowConfiguration::new(), &context())
            .await;

        assert_eq!(result.step_types(), vec![STEP_INITIAL_RETRIEVAL]);
        assert_eq!(result.metric("initial_documents"), Some(&json!(0)));
        assert_eq!(result.metric("reranked_documents"), Some(&json!(0)));
        assert!(!result.response_changed());
        assert!(!result.is_error());
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unparseable_ranking_keeps_retrieval_order() {
        let llm = Arc::new(ScriptedLlm::texts(&[
            "They all look equally useful.",
            "Answer citing [1] and [2] and [1].",
        ]));
        let processor = processor(llm.clone(), Arc::new(ScriptedRag::with_documents(documents(4))));

        let result = processor
            .process("Q", &AgenticFlowConfiguration::new(), &context())
            .await;

        assert_eq!(
            result.step_types(),
            vec![STEP_INITIAL_RETRIEVAL, STEP_DOCUMENT_RERANKING, STEP_RESPONSE_GENERATION]
        );
        assert_eq!(result.metric("reranked_documents"), Some(&json!(4)));
        assert_eq!(result.metric("citations_count"), Some(&json!(2)));
        assert_eq!(
            result.processing_steps()[1].metadata.get("ranking"),
            Some(&json!([1, 2, 3, 4]))
        );
        let answer_prompt = &llm.prompts()[1];
        assert!(answer_prompt.contains("[1] Doc 1"));
        assert!(answer_prompt.contains("[3] Doc 3"));
        assert!(!answer_prompt.contains("Doc 4"));
    }

    #[tokio::test]
    async fn test_ranking_reorders_documents() {
        let llm = Arc::new(ScriptedLlm::texts(&["Best: 3, then 1", "See [1]."]));
        let processor = processor(llm.clone(), Arc::new(ScriptedRag::with_documents(documents(3))));
        let configuration = AgenticFlowConfiguration::new().with_parameter("final_document_count", 1);

        let result = processor.process("Q", &configuration, &context()).await;

        assert_eq!(
            result.processing_steps()[1].metadata.get("ranking"),
            Some(&json!([3, 1, 2]))
        );
        assert!(llm.prompts()[1].contains("[1] Doc 3"));
        assert_eq!(result.metric("final_documents"), Some(&json!(1)));
        assert!(result.response_changed());
    }

    #[tokio::test]
    async fn test_retrieval_count_forwarded() {
        let rag = Arc::new(ScriptedRag::empty());
        let processor = processor(Arc::new(ScriptedLlm::texts(&[])), rag.clone());
        let configuration =
            AgenticFlowConfiguration::new().with_parameter("initial_retrieval_count", 25);

        processor.process("Q", &configuration, &context()).await;

        assert_eq!(rag.queries(), vec![("Q".to_string(), 25)]);
    }

    #[tokio::test]
    async fn test_rag_failure_is_contained() {
        let processor = processor(
            Arc::new(ScriptedLlm::texts(&[])),
            Arc::new(ScriptedRag::failing("index offline")),
        );

        let result = processor
            .process("Q", &AgenticFlowConfiguration::new(), &context())
            .await;

        assert!(result.is_error());
        assert!(result.final_response().contains("re-ranking"));
        assert!(result.reasoning().contains("processing failure"));
        assert!(!result.response_changed());
    }

    #[tokio::test]
    async fn test_llm_failure_mid_protocol_is_contained() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            crate::flows::test_support::Scripted::text("1, 2"),
            crate::flows::test_support::Scripted::Error("overloaded".to_string()),
        ]));
        let processor = processor(llm, Arc::new(ScriptedRag::with_documents(documents(2))));

        let result = processor
            .process("Q", &AgenticFlowConfiguration::new(), &context())
            .await;

        assert!(result.is_error());
        assert!(result.final_response().contains("overloaded"));
    }

    #[test]
    fn test_validate_configuration() {
        let processor = processor(
            Arc::new(ScriptedLlm::texts(&[])),
            Arc::new(ScriptedRag::empty()),
        );
        let base = AgenticFlowConfiguration::new();
        assert!(processor.validate_configuration(&base));
        assert!(processor.validate_configuration(
            &base
                .with_parameter("initial_retrieval_count", 100)
                .with_parameter("final_document_count", 5)
                .with_parameter("reranking_criteria", "recency")
        ));
        assert!(!processor.validate_configuration(&base.with_parameter("initial_retrieval_count", 0)));
        assert!(!processor.validate_configuration(&base.with_parameter("initial_retrieval_count", 101)));
        assert!(!processor.validate_configuration(&base.with_parameter("initial_retrieval_count", 2.5)));
        assert!(!processor.validate_configuration(&base.with_parameter("final_document_count", "3")));
        assert!(!processor.validate_configuration(&base.with_parameter("reranking_criteria", 1)));
    }
}
