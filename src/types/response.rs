//! Response bodies for the search endpoint

use serde::Serialize;

use crate::types::document::RetrievedDocument;

/// Successful answer, shaped per retrieval backend
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SearchResponse {
    /// Vector backend: generated answer plus the documents behind it
    Vector {
        answer: String,
        documents: Vec<RetrievedDocument>,
    },
    /// Text backend: generated answer only
    Text { response: String },
}
