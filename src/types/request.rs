//! Search request body and validation

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};

/// Body of `POST /search`
///
/// `query` is deserialized as a raw JSON value so that a missing
/// field, a non-string value and a blank string can each be reported
/// with its own message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: Option<Value>,
}

impl SearchRequest {
    /// Validate the body and return the trimmed query string
    pub fn query(&self) -> Result<&str> {
        let value = self
            .query
            .as_ref()
            .ok_or_else(|| Error::InvalidQuery("Query is required".to_string()))?;

        match value.as_str() {
            Some(s) if !s.trim().is_empty() => Ok(s.trim()),
            _ => Err(Error::InvalidQuery(
                "Query must be a non-empty string".to_string(),
            )),
        }
    }
}
