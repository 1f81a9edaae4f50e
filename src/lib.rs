//! ragrelay: retrieval-augmented answer service over a document store
//!
//! Accepts a natural-language query over HTTP, retrieves matching
//! documents from an existing store, and asks a chat-completion API for
//! an answer grounded in them. Retrieval is delegated entirely to one
//! of two backends: an in-memory vector index populated at startup, or
//! the database's own full-text index queried across every collection.

pub mod config;
pub mod error;
pub mod generation;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod storage;
pub mod types;

pub use config::{Config, SearchBackend};
pub use error::{Error, Result};
pub use types::{Document, RetrievedDocument, SearchRequest, SearchResponse};
