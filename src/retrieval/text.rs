//! Full-text retrieval across every collection in the store

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::retrieval::Retriever;
use crate::storage::DocumentDb;
use crate::types::RetrievedDocument;

/// Searches each collection's FTS index in discovery order and
/// concatenates the results
///
/// No cross-collection ranking and no deduplication; a collection
/// that fails to search is logged and skipped.
pub struct TextRetriever {
    db: Arc<DocumentDb>,
    collection_limit: usize,
}

impl TextRetriever {
    pub fn new(db: Arc<DocumentDb>, collection_limit: usize) -> Self {
        Self {
            db,
            collection_limit,
        }
    }
}

#[async_trait]
impl Retriever for TextRetriever {
    async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedDocument>> {
        let db = Arc::clone(&self.db);
        let query = query.to_string();
        let limit = self.collection_limit;

        // rusqlite is sync; run the whole collection loop off the
        // async runtime, one collection at a time
        tokio::task::spawn_blocking(move || {
            let mut documents = Vec::new();

            for collection in db.list_collections()? {
                match db.search_collection(&collection, &query, limit) {
                    Ok(records) => {
                        documents.extend(records.into_iter().map(RetrievedDocument::Record))
                    }
                    Err(e) => {
                        tracing::warn!("Search failed for collection '{}': {}", collection, e)
                    }
                }
            }

            Ok(documents)
        })
        .await
        .map_err(|e| Error::Internal(format!("Task join error: {}", e)))?
    }

    fn name(&self) -> &str {
        "text"
    }
}
