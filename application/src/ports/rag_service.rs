//! Retrieval port used by the RAG re-ranking flow.

use crate::ports::service_error::ServiceError;
use async_trait::async_trait;
use flow_domain::Document;

#[async_trait]
pub trait RagServicePort: Send + Sync {
    /// Retrieve up to `count` documents for `query`, best first
    async fn retrieve_documents(
        &self,
        query: &str,
        count: usize,
    ) -> Result<Vec<Document>, ServiceError>;
}
