//! SQLite access for the document store
//!
//! The store is owned by an external system. This service only reads
//! from it; the sole write it performs is creating FTS5 indexes at
//! startup for the text backend.

use parking_lot::Mutex;
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection};
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::types::Document;

/// Handle to the backing document database
pub struct DocumentDb {
    conn: Arc<Mutex<Connection>>,
}

impl DocumentDb {
    /// Open the database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)
            .map_err(|e| Error::Database(format!("Failed to open database: {}", e)))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::Database(format!("Failed to open in-memory database: {}", e)))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Seed helper for tests
    #[cfg(test)]
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.conn
            .lock()
            .execute_batch(sql)
            .map_err(|e| Error::Database(e.to_string()))
    }

    /// List user collections in discovery order, skipping this
    /// service's own FTS index tables
    pub fn list_collections(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock();

        let mut stmt = conn
            .prepare(
                "SELECT name FROM sqlite_master \
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
                 AND name NOT LIKE '%\\_fts%' ESCAPE '\\' \
                 ORDER BY rowid",
            )
            .map_err(|e| Error::Database(format!("Failed to list collections: {}", e)))?;

        let names = stmt
            .query_map([], |row| row.get(0))
            .map_err(|e| Error::Database(format!("Failed to list collections: {}", e)))?
            .filter_map(|r| r.ok())
            .collect();

        Ok(names)
    }

    /// Ensure an FTS5 index covering all columns exists for every
    /// collection
    ///
    /// A collection whose index cannot be created is logged and
    /// skipped; startup continues with the remaining collections.
    pub fn ensure_text_indexes(&self) -> Result<()> {
        let collections = self.list_collections()?;
        let conn = self.conn.lock();

        for table in &collections {
            match create_text_index(&conn, table) {
                Ok(()) => tracing::info!("Text index ready for collection '{}'", table),
                Err(e) => {
                    tracing::warn!("Text index for collection '{}' unavailable: {}", table, e)
                }
            }
        }

        Ok(())
    }

    /// Full-text search one collection, returning its rows as
    /// schema-less JSON records
    pub fn search_collection(&self, table: &str, query: &str, limit: usize) -> Result<Vec<Value>> {
        let conn = self.conn.lock();

        // Quote the query so user input is matched as a phrase rather
        // than interpreted as FTS5 syntax
        let fts_query = format!("\"{}\"", query.replace('"', "\"\""));

        let sql = format!(
            "SELECT t.* FROM \"{table}_fts\" \
             JOIN \"{table}\" t ON t.rowid = \"{table}_fts\".rowid \
             WHERE \"{table}_fts\" MATCH ?1 \
             ORDER BY bm25(\"{table}_fts\") \
             LIMIT ?2"
        );

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| Error::Database(format!("Failed to prepare search for '{}': {}", table, e)))?;

        let column_names: Vec<String> =
            stmt.column_names().iter().map(|n| n.to_string()).collect();

        let rows = stmt
            .query_map(params![fts_query, limit as i64], |row| {
                let mut record = Map::new();
                for (i, name) in column_names.iter().enumerate() {
                    record.insert(name.clone(), column_value(row.get_ref(i)?));
                }
                Ok(Value::Object(record))
            })
            .map_err(|e| Error::Database(format!("Search failed for '{}': {}", table, e)))?;

        let mut records = Vec::new();
        for row in rows {
            records
                .push(row.map_err(|e| Error::Database(format!("Search failed for '{}': {}", table, e)))?);
        }

        Ok(records)
    }

    /// Load every row of the `documents` table (vector backend
    /// startup)
    pub fn load_documents(&self) -> Result<Vec<Document>> {
        let conn = self.conn.lock();

        let mut stmt = conn
            .prepare("SELECT model, content FROM documents")
            .map_err(|e| Error::Database(format!("Failed to read documents: {}", e)))?;

        let documents = stmt
            .query_map([], |row| {
                Ok(Document {
                    model: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                    content: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                })
            })
            .map_err(|e| Error::Database(format!("Failed to read documents: {}", e)))?
            .filter_map(|r| r.ok())
            .collect();

        Ok(documents)
    }
}

/// Create an external-content FTS5 table mirroring every column of
/// `table`, then rebuild it so pre-existing rows are indexed
fn create_text_index(conn: &Connection, table: &str) -> Result<()> {
    let columns = table_columns(conn, table)?;
    if columns.is_empty() {
        return Err(Error::Database(format!("Collection '{}' has no columns", table)));
    }

    let column_list = columns
        .iter()
        .map(|c| format!("\"{}\"", c))
        .collect::<Vec<_>>()
        .join(", ");

    conn.execute_batch(&format!(
        "CREATE VIRTUAL TABLE IF NOT EXISTS \"{table}_fts\" \
         USING fts5({column_list}, content='{table}', content_rowid='rowid')"
    ))
    .map_err(|e| Error::Database(format!("Failed to create index: {}", e)))?;

    conn.execute_batch(&format!(
        "INSERT INTO \"{table}_fts\"(\"{table}_fts\") VALUES('rebuild')"
    ))
    .map_err(|e| Error::Database(format!("Failed to rebuild index: {}", e)))?;

    Ok(())
}

fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info(\"{}\")", table))
        .map_err(|e| Error::Database(format!("Failed to inspect '{}': {}", table, e)))?;

    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .map_err(|e| Error::Database(format!("Failed to inspect '{}': {}", table, e)))?
        .filter_map(|r| r.ok())
        .collect();

    Ok(columns)
}

fn column_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(n) => Value::from(n),
        ValueRef::Real(f) => Value::from(f),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::String(format!("<{} byte blob>", b.len())),
    }
}
