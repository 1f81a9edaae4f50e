//! Document types read from the backing store

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A row of the `documents` table
///
/// Documents are created externally; this service only reads them, at
/// startup (vector indexing) and at query time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Category or source label
    pub model: String,
    /// Free-text body
    pub content: String,
}

/// A document judged relevant to a query, ordered as the retrieval
/// engine returned it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RetrievedDocument {
    /// Vector hit with its cosine similarity score
    Scored {
        model: String,
        content: String,
        score: f32,
    },
    /// Schema-less record from a full-text collection search
    Record(Value),
}

impl RetrievedDocument {
    /// Render for inclusion in the LLM context block
    pub fn render(&self) -> String {
        match self {
            Self::Scored { model, content, .. } => {
                format!("Model: {}\nContent: {}", model, content)
            }
            Self::Record(value) => value.to_string(),
        }
    }
}
