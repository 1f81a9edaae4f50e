//! In-memory vector index
//!
//! Populated once at startup and only read afterwards; concurrent
//! reads during request handling never contend with writes.

use parking_lot::RwLock;

use crate::types::RetrievedDocument;

struct IndexEntry {
    model: String,
    content: String,
    embedding: Vec<f32>,
    norm: f32,
}

/// Brute-force cosine similarity index over embedded documents
#[derive(Default)]
pub struct VectorIndex {
    entries: RwLock<Vec<IndexEntry>>,
}

impl VectorIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a document with its embedding
    pub fn insert(&self, model: String, content: String, embedding: Vec<f32>) {
        let norm = l2_norm(&embedding);
        self.entries.write().push(IndexEntry {
            model,
            content,
            embedding,
            norm,
        });
    }

    /// Number of indexed documents
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the `top_k` nearest documents by descending cosine
    /// similarity
    pub fn search(&self, query: &[f32], top_k: usize) -> Vec<RetrievedDocument> {
        let query_norm = l2_norm(query);
        let entries = self.entries.read();

        let mut results: Vec<RetrievedDocument> = entries
            .iter()
            .map(|entry| RetrievedDocument::Scored {
                model: entry.model.clone(),
                content: entry.content.clone(),
                score: cosine_similarity(query, &entry.embedding, query_norm, entry.norm),
            })
            .collect();

        results.sort_by(|a, b| {
            score_of(b)
                .partial_cmp(&score_of(a))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(top_k);

        results
    }
}

fn score_of(doc: &RetrievedDocument) -> f32 {
    match doc {
        RetrievedDocument::Scored { score, .. } => *score,
        RetrievedDocument::Record(_) => 0.0,
    }
}

fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

fn cosine_similarity(a: &[f32], b: &[f32], a_norm: f32, b_norm: f32) -> f32 {
    if a_norm == 0.0 || b_norm == 0.0 {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    dot / (a_norm * b_norm)
}
