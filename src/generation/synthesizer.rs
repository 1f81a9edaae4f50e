//! Answer synthesis via a chat-completion provider

use std::sync::Arc;

use crate::error::Result;
use crate::providers::ChatProvider;
use crate::types::RetrievedDocument;

use super::prompt::{PromptBuilder, SYSTEM_PROMPT};

/// Combines a query with retrieved context and calls the LLM
pub struct AnswerSynthesizer {
    chat: Arc<dyn ChatProvider>,
}

impl AnswerSynthesizer {
    pub fn new(chat: Arc<dyn ChatProvider>) -> Self {
        Self { chat }
    }

    /// Generate an answer grounded in the retrieved documents
    ///
    /// Provider failures propagate; the query handler maps them to a
    /// 500 response.
    pub async fn synthesize(
        &self,
        query: &str,
        documents: &[RetrievedDocument],
    ) -> Result<String> {
        let context = PromptBuilder::build_context(documents);
        let prompt = PromptBuilder::build_user_prompt(query, &context);

        tracing::debug!(
            "Synthesizing answer with {} ({} documents in context)",
            self.chat.name(),
            documents.len()
        );

        self.chat.complete(SYSTEM_PROMPT, &prompt).await
    }
}
