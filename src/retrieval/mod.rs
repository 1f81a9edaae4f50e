//! Retrieval strategies over the backing store

pub mod index;
pub mod text;
pub mod vector;

pub use index::VectorIndex;
pub use text::TextRetriever;
pub use vector::VectorRetriever;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::RetrievedDocument;

/// A strategy for finding documents relevant to a query
///
/// Retrieval always runs before synthesis; implementations own the
/// relevance signal entirely.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Return matching documents in the engine's relevance order
    async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedDocument>>;

    /// Strategy name for logging
    fn name(&self) -> &str;
}
