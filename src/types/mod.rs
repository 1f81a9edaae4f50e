//! Request, response and document types

pub mod document;
pub mod request;
pub mod response;

pub use document::{Document, RetrievedDocument};
pub use request::SearchRequest;
pub use response::SearchResponse;
