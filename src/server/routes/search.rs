//! Search endpoint: validate, retrieve, synthesize

use axum::{extract::State, Json};

use crate::config::SearchBackend;
use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{SearchRequest, SearchResponse};

/// POST /search
///
/// Retrieval always runs before synthesis. The text backend rejects
/// queries that match nothing with 404; the vector backend proceeds
/// to synthesis regardless and returns a best-effort answer.
pub async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>> {
    let query = request.query()?;
    tracing::info!("Query: \"{}\"", query);

    let documents = state.retriever().retrieve(query).await?;
    tracing::debug!(
        "Retrieved {} documents via {} search",
        documents.len(),
        state.retriever().name()
    );

    if documents.is_empty() && state.backend() == SearchBackend::Text {
        return Err(Error::NoMatches);
    }

    let answer = state.synthesizer().synthesize(query, &documents).await?;

    let response = match state.backend() {
        SearchBackend::Vector => SearchResponse::Vector { answer, documents },
        SearchBackend::Text => SearchResponse::Text { response: answer },
    };

    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::config::Config;
    use crate::providers::{ChatProvider, EmbeddingProvider};
    use crate::storage::DocumentDb;

    /// Deterministic embedder: letter histogram, so related texts
    /// score above unrelated ones
    #[derive(Default)]
    struct FakeEmbedder {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EmbeddingProvider for FakeEmbedder {
        async fn embed(&self, text: &str) -> crate::error::Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut v = vec![0.0f32; 26];
            for b in text.bytes() {
                if b.is_ascii_alphabetic() {
                    v[(b.to_ascii_lowercase() - b'a') as usize] += 1.0;
                }
            }
            Ok(v)
        }

        async fn health_check(&self) -> crate::error::Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "fake-embedder"
        }
    }

    #[derive(Default)]
    struct FakeChat {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ChatProvider for FakeChat {
        async fn complete(&self, _system: &str, user: &str) -> crate::error::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("generated answer from {} chars of prompt", user.len()))
        }

        async fn health_check(&self) -> crate::error::Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "fake-chat"
        }

        fn model(&self) -> &str {
            "fake-model"
        }
    }

    struct FailingChat;

    #[async_trait]
    impl ChatProvider for FailingChat {
        async fn complete(&self, _system: &str, _user: &str) -> crate::error::Result<String> {
            Err(Error::Llm("provider unavailable".to_string()))
        }

        async fn health_check(&self) -> crate::error::Result<bool> {
            Ok(false)
        }

        fn name(&self) -> &str {
            "failing-chat"
        }

        fn model(&self) -> &str {
            "failing-model"
        }
    }

    fn request(query: serde_json::Value) -> SearchRequest {
        SearchRequest { query: Some(query) }
    }

    async fn text_state(db: Arc<DocumentDb>) -> (AppState, Arc<FakeEmbedder>, Arc<FakeChat>) {
        let config = Config {
            backend: SearchBackend::Text,
            ..Config::default()
        };
        let embedder = Arc::new(FakeEmbedder::default());
        let chat = Arc::new(FakeChat::default());
        let state = AppState::with_database(config, db, embedder.clone(), chat.clone())
            .await
            .unwrap();
        (state, embedder, chat)
    }

    async fn vector_state(db: Arc<DocumentDb>) -> (AppState, Arc<FakeEmbedder>, Arc<FakeChat>) {
        let config = Config::default();
        let embedder = Arc::new(FakeEmbedder::default());
        let chat = Arc::new(FakeChat::default());
        let state = AppState::with_database(config, db, embedder.clone(), chat.clone())
            .await
            .unwrap();
        (state, embedder, chat)
    }

    #[tokio::test]
    async fn missing_query_is_rejected_before_any_provider_call() {
        let db = Arc::new(DocumentDb::in_memory().unwrap());
        let (state, embedder, chat) = text_state(db).await;

        let err = search(State(state), Json(SearchRequest { query: None }))
            .await
            .expect_err("missing query must fail");

        match &err {
            Error::InvalidQuery(msg) => assert_eq!(msg, "Query is required"),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
        assert_eq!(chat.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn non_string_and_blank_queries_are_rejected() {
        let db = Arc::new(DocumentDb::in_memory().unwrap());
        let (state, embedder, chat) = text_state(db).await;

        for bad in [json!(42), json!("   "), json!(["Widget"])] {
            let err = search(State(state.clone()), Json(request(bad)))
                .await
                .expect_err("invalid query must fail");
            match err {
                Error::InvalidQuery(msg) => {
                    assert_eq!(msg, "Query must be a non-empty string")
                }
                other => panic!("unexpected error: {:?}", other),
            }
        }
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
        assert_eq!(chat.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn text_backend_returns_404_without_calling_the_llm() {
        let db = Arc::new(DocumentDb::in_memory().unwrap());
        db.execute_batch(
            "CREATE TABLE products (name TEXT); INSERT INTO products (name) VALUES ('Widget');",
        )
        .unwrap();
        let (state, _embedder, chat) = text_state(db).await;

        let err = search(State(state), Json(request(json!("Nonexistent"))))
            .await
            .expect_err("no matches must fail");

        assert!(matches!(err, Error::NoMatches));
        assert_eq!(chat.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn text_backend_answers_from_a_matching_collection() {
        let db = Arc::new(DocumentDb::in_memory().unwrap());
        db.execute_batch(
            "CREATE TABLE products (name TEXT); INSERT INTO products (name) VALUES ('Widget');",
        )
        .unwrap();
        let (state, _embedder, chat) = text_state(db).await;

        let Json(response) = search(State(state), Json(request(json!("Widget"))))
            .await
            .unwrap();

        match response {
            SearchResponse::Text { response } => {
                assert!(response.starts_with("generated answer"))
            }
            other => panic!("unexpected response shape: {:?}", other),
        }
        assert_eq!(chat.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failing_collection_still_yields_an_aggregated_answer() {
        let db = Arc::new(DocumentDb::in_memory().unwrap());
        db.execute_batch(
            r#"
            CREATE TABLE products (name TEXT);
            INSERT INTO products (name) VALUES ('Widget');
            CREATE TABLE faqs (answer TEXT);
            INSERT INTO faqs (answer) VALUES ('Widget refunds within 30 days');
            "#,
        )
        .unwrap();
        let (state, _embedder, chat) = text_state(Arc::clone(&db)).await;

        // Break one collection after startup indexing
        db.execute_batch("DROP TABLE products_fts;").unwrap();

        let Json(response) = search(State(state), Json(request(json!("Widget"))))
            .await
            .unwrap();

        assert!(matches!(response, SearchResponse::Text { .. }));
        assert_eq!(chat.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn vector_backend_returns_answer_and_documents() {
        let db = Arc::new(DocumentDb::in_memory().unwrap());
        db.execute_batch(
            "CREATE TABLE documents (model TEXT, content TEXT); \
             INSERT INTO documents (model, content) VALUES ('gpt', 'refund policy explained');",
        )
        .unwrap();
        let (state, embedder, chat) = vector_state(db).await;

        // Startup indexing embedded the single stored document
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 1);

        let Json(response) = search(State(state), Json(request(json!("refund"))))
            .await
            .unwrap();

        match response {
            SearchResponse::Vector { answer, documents } => {
                assert!(!answer.is_empty());
                assert_eq!(documents.len(), 1);
                match &documents[0] {
                    crate::types::RetrievedDocument::Scored { model, content, score } => {
                        assert_eq!(model, "gpt");
                        assert_eq!(content, "refund policy explained");
                        assert!(*score > 0.0);
                    }
                    other => panic!("unexpected document: {:?}", other),
                }
            }
            other => panic!("unexpected response shape: {:?}", other),
        }
        assert_eq!(chat.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn vector_backend_synthesizes_even_with_an_empty_index() {
        // No documents table at all: startup logs the load failure
        // and serves with an empty index
        let db = Arc::new(DocumentDb::in_memory().unwrap());
        let (state, _embedder, chat) = vector_state(db).await;

        let Json(response) = search(State(state), Json(request(json!("anything"))))
            .await
            .unwrap();

        match response {
            SearchResponse::Vector { answer, documents } => {
                assert!(!answer.is_empty());
                assert!(documents.is_empty());
            }
            other => panic!("unexpected response shape: {:?}", other),
        }
        assert_eq!(chat.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn llm_failure_surfaces_as_internal_error() {
        let db = Arc::new(DocumentDb::in_memory().unwrap());
        db.execute_batch(
            "CREATE TABLE documents (model TEXT, content TEXT); \
             INSERT INTO documents (model, content) VALUES ('gpt', 'refund policy explained');",
        )
        .unwrap();

        let config = Config::default();
        let embedder = Arc::new(FakeEmbedder::default());
        let state = AppState::with_database(config, db, embedder, Arc::new(FailingChat))
            .await
            .unwrap();

        let err = search(State(state), Json(request(json!("refund"))))
            .await
            .expect_err("llm failure must propagate");

        assert!(matches!(err, Error::Llm(_)));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn repeated_queries_retrieve_identical_documents() {
        let db = Arc::new(DocumentDb::in_memory().unwrap());
        db.execute_batch(
            "CREATE TABLE documents (model TEXT, content TEXT); \
             INSERT INTO documents (model, content) VALUES \
                 ('gpt', 'refund policy explained'), \
                 ('gpt', 'shipping rates overview'), \
                 ('claude', 'warranty terms summary');",
        )
        .unwrap();
        let (state, _embedder, _chat) = vector_state(db).await;

        let first = state.retriever().retrieve("refund").await.unwrap();
        let second = state.retriever().retrieve("refund").await.unwrap();
        assert_eq!(first, second);
    }
}
