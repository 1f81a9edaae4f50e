//! Vector similarity retrieval

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;
use crate::providers::EmbeddingProvider;
use crate::retrieval::{Retriever, VectorIndex};
use crate::types::RetrievedDocument;

/// Embeds the query and returns the nearest documents from the
/// in-memory index
pub struct VectorRetriever {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<VectorIndex>,
    top_k: usize,
}

impl VectorRetriever {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, index: Arc<VectorIndex>, top_k: usize) -> Self {
        Self {
            embedder,
            index,
            top_k,
        }
    }
}

#[async_trait]
impl Retriever for VectorRetriever {
    async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedDocument>> {
        let embedding = self.embedder.embed(query).await?;
        Ok(self.index.search(&embedding, self.top_k))
    }

    fn name(&self) -> &str {
        "vector"
    }
}
