//! Application state for the answer service
//!
//! The state is built once at startup and is read-only afterwards;
//! request handlers share it through an `Arc`.

use std::sync::Arc;

use crate::config::{Config, SearchBackend};
use crate::error::{Error, Result};
use crate::generation::AnswerSynthesizer;
use crate::providers::{ChatProvider, EmbeddingProvider, OpenAiClient};
use crate::retrieval::{Retriever, TextRetriever, VectorIndex, VectorRetriever};
use crate::storage::DocumentDb;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    retriever: Arc<dyn Retriever>,
    synthesizer: AnswerSynthesizer,
}

impl AppState {
    /// Construct state for the configured backend, connecting to the
    /// store and running startup indexing
    pub async fn new(config: Config) -> Result<Self> {
        let client = Arc::new(OpenAiClient::new(&config.llm)?);
        let embedder: Arc<dyn EmbeddingProvider> = client.clone();
        let chat: Arc<dyn ChatProvider> = client;

        let db = Arc::new(DocumentDb::open(&config.database.path)?);
        Self::with_database(config, db, embedder, chat).await
    }

    /// Construct state with an explicit store and providers
    ///
    /// This is the seam tests use to inject fakes.
    pub async fn with_database(
        config: Config,
        db: Arc<DocumentDb>,
        embedder: Arc<dyn EmbeddingProvider>,
        chat: Arc<dyn ChatProvider>,
    ) -> Result<Self> {
        let retriever: Arc<dyn Retriever> = match config.backend {
            SearchBackend::Vector => {
                tracing::info!("Using vector backend (in-memory index)");
                let index = Arc::new(VectorIndex::new());
                populate_index(&db, &embedder, &index).await;
                Arc::new(VectorRetriever::new(
                    embedder,
                    index,
                    config.retrieval.top_k,
                ))
            }
            SearchBackend::Text => {
                tracing::info!("Using text backend (database full-text search)");
                let indexing_db = Arc::clone(&db);
                tokio::task::spawn_blocking(move || indexing_db.ensure_text_indexes())
                    .await
                    .map_err(|e| Error::Internal(format!("Task join error: {}", e)))??;
                Arc::new(TextRetriever::new(db, config.retrieval.collection_limit))
            }
        };

        let synthesizer = AnswerSynthesizer::new(chat);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                retriever,
                synthesizer,
            }),
        })
    }

    /// Get configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the configured retrieval backend
    pub fn backend(&self) -> SearchBackend {
        self.inner.config.backend
    }

    /// Get the retriever
    pub fn retriever(&self) -> &Arc<dyn Retriever> {
        &self.inner.retriever
    }

    /// Get the answer synthesizer
    pub fn synthesizer(&self) -> &AnswerSynthesizer {
        &self.inner.synthesizer
    }
}

/// Load every document and embed it into the index
///
/// One-time, best-effort startup action: a document whose embedding
/// call fails is skipped, and a missing or unreadable `documents`
/// table leaves the index empty rather than failing startup.
async fn populate_index(
    db: &Arc<DocumentDb>,
    embedder: &Arc<dyn EmbeddingProvider>,
    index: &Arc<VectorIndex>,
) {
    let loading_db = Arc::clone(db);
    let documents = match tokio::task::spawn_blocking(move || loading_db.load_documents()).await {
        Ok(Ok(documents)) => documents,
        Ok(Err(e)) => {
            tracing::error!("Failed to load documents for indexing: {}", e);
            return;
        }
        Err(e) => {
            tracing::error!("Task join error while loading documents: {}", e);
            return;
        }
    };

    let total = documents.len();
    for document in documents {
        match embedder.embed(&document.content).await {
            Ok(embedding) => index.insert(document.model, document.content, embedding),
            Err(e) => tracing::warn!("Skipping document during indexing: {}", e),
        }
    }

    tracing::info!("Indexed {}/{} documents into the vector index", index.len(), total);
}
