//! Chat-completion provider trait

use async_trait::async_trait;

use crate::error::Result;

/// Trait for LLM chat completion
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Generate a completion for a system + user message pair,
    /// returning the model's text verbatim
    async fn complete(&self, system: &str, user: &str) -> Result<String>;

    /// Check if the provider is reachable
    async fn health_check(&self) -> Result<bool>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model identifier used for generation
    fn model(&self) -> &str;
}
