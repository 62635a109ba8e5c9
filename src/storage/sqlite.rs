//! SQLite storage implementation

use std::path::Path;
use rusqlite::{Connection, Row, Transaction, params};
use rusqlite::types::ValueRef;
use crate::{Result, Error};
use crate::vector;
use super::schema;

/// A stored sentence together with its embedding
#[derive(Debug, Clone, PartialEq)]
pub struct SentenceRecord {
    pub id: i64,
    pub source_path: String,
    pub sentence_text: String,
    pub embedding: Vec<f32>,
}

/// SQLite-backed storage for sentence embeddings
///
/// Every record's embedding has exactly `embedding_dim` components; this is
/// checked on every write and again when records are read back.
pub struct SentenceStore {
    conn: Option<Connection>,
    embedding_dim: usize,
}

impl SentenceStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path, embedding_dim: usize) -> Result<Self> {
        let conn = Connection::open(path)?;
        tracing::debug!("Opened sentence store at {} (dim {})", path.display(), embedding_dim);
        Self::with_connection(conn, embedding_dim)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory(embedding_dim: usize) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn, embedding_dim)
    }

    fn with_connection(conn: Connection, embedding_dim: usize) -> Result<Self> {
        if embedding_dim == 0 {
            return Err(Error::InvalidArgument("embedding dimension must be at least 1".to_string()));
        }
        let store = Self { conn: Some(conn), embedding_dim };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<()> {
        let conn = self.conn()?;
        for stmt in schema::all_schema_statements() {
            conn.execute(stmt, [])?;
        }
        Ok(())
    }

    fn conn(&self) -> Result<&Connection> {
        self.conn.as_ref().ok_or(Error::StoreClosed)
    }

    /// Dimension every stored embedding must have
    pub fn embedding_dim(&self) -> usize {
        self.embedding_dim
    }

    /// False once [`close`](Self::close) has succeeded
    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    // ========== Write Operations ==========

    /// Insert one record and commit it before returning.
    ///
    /// Returns the id assigned by the database.
    pub fn insert(&self, source_path: &str, sentence_text: &str, embedding: &[f32]) -> Result<i64> {
        insert_row(self.conn()?, self.embedding_dim, source_path, sentence_text, embedding)
    }

    /// Start a scoped write transaction.
    ///
    /// Rows inserted through the returned [`WriteBatch`] become visible only
    /// when it is committed. Dropping it without committing rolls back.
    pub fn begin_batch(&mut self) -> Result<WriteBatch<'_>> {
        let embedding_dim = self.embedding_dim;
        let conn = self.conn.as_mut().ok_or(Error::StoreClosed)?;
        let tx = conn.transaction()?;
        Ok(WriteBatch { tx, embedding_dim, inserted: 0 })
    }

    /// Delete all records (for re-indexing)
    pub fn clear(&self) -> Result<()> {
        let removed = self.conn()?.execute("DELETE FROM sentences", [])?;
        tracing::info!("Cleared sentence store ({} records removed)", removed);
        Ok(())
    }

    // ========== Read Operations ==========

    /// Read every record in storage order.
    ///
    /// Records that cannot be decoded are logged and skipped; they never
    /// fail the scan.
    pub fn scan_all(&self) -> Result<Vec<SentenceRecord>> {
        let mut stmt = self.conn()?.prepare(
            "SELECT id, source_path, sentence_text, embedding FROM sentences ORDER BY id"
        )?;
        let mut rows = stmt.query([])?;

        let mut records = Vec::new();
        let mut skipped = 0usize;
        while let Some(row) = rows.next()? {
            match self.row_to_record(row) {
                Ok(record) => records.push(record),
                Err(e) => {
                    skipped += 1;
                    tracing::warn!("Skipping record: {}", e);
                }
            }
        }

        if skipped > 0 {
            tracing::warn!("Scan skipped {} malformed record(s)", skipped);
        }
        Ok(records)
    }

    /// Helper to convert a row to a SentenceRecord
    fn row_to_record(&self, row: &Row) -> Result<SentenceRecord> {
        let id: i64 = row.get(0)?;
        let malformed = |reason: String| Error::MalformedRecord { id, reason };

        let source_path = read_text(row, 1).map_err(malformed)?;
        let sentence_text = read_text(row, 2).map_err(malformed)?;
        let embedding = match row.get_ref(3)? {
            ValueRef::Blob(blob) => vector::decode(blob, self.embedding_dim),
            other => Err(format!("embedding stored as {} instead of a blob", other.data_type())),
        }
        .map_err(malformed)?;

        Ok(SentenceRecord { id, source_path, sentence_text, embedding })
    }

    /// Count all records
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self.conn()?.query_row("SELECT COUNT(*) FROM sentences", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Count distinct source documents
    pub fn count_sources(&self) -> Result<usize> {
        let count: i64 = self.conn()?.query_row(
            "SELECT COUNT(DISTINCT source_path) FROM sentences",
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<StoreStats> {
        Ok(StoreStats {
            records: self.count()?,
            sources: self.count_sources()?,
            embedding_dim: self.embedding_dim,
        })
    }

    /// Release the database handle. Every later call fails with
    /// [`Error::StoreClosed`].
    pub fn close(&mut self) -> Result<()> {
        let conn = self.conn.take().ok_or(Error::StoreClosed)?;
        conn.close().map_err(|(_, e)| Error::StorageUnavailable(e))?;
        tracing::debug!("Sentence store closed");
        Ok(())
    }
}

/// Scoped write transaction over a [`SentenceStore`]
pub struct WriteBatch<'a> {
    tx: Transaction<'a>,
    embedding_dim: usize,
    inserted: usize,
}

impl WriteBatch<'_> {
    /// Insert one record into the pending transaction
    pub fn insert(&mut self, source_path: &str, sentence_text: &str, embedding: &[f32]) -> Result<i64> {
        let id = insert_row(&self.tx, self.embedding_dim, source_path, sentence_text, embedding)?;
        self.inserted += 1;
        Ok(id)
    }

    /// Number of rows inserted so far
    pub fn len(&self) -> usize {
        self.inserted
    }

    pub fn is_empty(&self) -> bool {
        self.inserted == 0
    }

    /// Commit every pending row at once, returning how many were written
    pub fn commit(self) -> Result<usize> {
        let inserted = self.inserted;
        self.tx.commit()?;
        Ok(inserted)
    }

    /// Discard every pending row.
    ///
    /// Same effect as dropping the batch, except that a failed rollback is
    /// reported instead of silently ignored.
    pub fn rollback(self) -> Result<()> {
        self.tx.rollback()?;
        Ok(())
    }
}

fn insert_row(
    conn: &Connection,
    embedding_dim: usize,
    source_path: &str,
    sentence_text: &str,
    embedding: &[f32],
) -> Result<i64> {
    if embedding.len() != embedding_dim {
        return Err(Error::DimensionMismatch { expected: embedding_dim, got: embedding.len() });
    }

    conn.execute(
        "INSERT INTO sentences (source_path, sentence_text, embedding) VALUES (?1, ?2, ?3)",
        params![source_path, sentence_text, vector::encode(embedding)],
    )?;
    Ok(conn.last_insert_rowid())
}

fn read_text(row: &Row, idx: usize) -> std::result::Result<String, String> {
    match row.get_ref(idx) {
        Ok(ValueRef::Text(bytes)) => String::from_utf8(bytes.to_vec())
            .map_err(|e| format!("column {} is not valid UTF-8: {}", idx, e)),
        Ok(other) => Err(format!("column {} stored as {} instead of text", idx, other.data_type())),
        Err(e) => Err(e.to_string()),
    }
}

/// Database statistics
#[derive(Debug, Clone)]
pub struct StoreStats {
    pub records: usize,
    pub sources: usize,
    pub embedding_dim: usize,
}

impl std::fmt::Display for StoreStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        writeln!(f, "  Sentences: {}", self.records)?;
        writeln!(f, "  Documents: {}", self.sources)?;
        writeln!(f, "  Embedding dimension: {}", self.embedding_dim)
    }
}
