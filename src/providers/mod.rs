//! Provider abstractions for embeddings and chat completion
//!
//! Trait seams keep the handler testable with fakes and leave the
//! door open for alternative LLM backends.

pub mod chat;
pub mod embedding;
pub mod openai;

pub use chat::ChatProvider;
pub use embedding::EmbeddingProvider;
pub use openai::OpenAiClient;
