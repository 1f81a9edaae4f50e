//! Prompt templates for answer generation

use crate::types::RetrievedDocument;

/// Fixed system instruction sent with every completion
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Prompt builder for grounded answers
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build the context block from retrieved documents, one rendered
    /// document per line group
    pub fn build_context(documents: &[RetrievedDocument]) -> String {
        documents
            .iter()
            .map(RetrievedDocument::render)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Build the user message combining the fixed instruction, the
    /// retrieved context and the query
    pub fn build_user_prompt(query: &str, context: &str) -> String {
        format!(
            "Answer the question using the documents below.\n\n\
             Documents:\n{context}\n\n\
             Question: {query}"
        )
    }
}
