//! # Docseek - Local semantic document search
//!
//! Point docseek at a folder, and it will split the documents into
//! sentences, embed them with a local transformer model, and keep them in
//! SQLite for later retrieval.
//!
//! Docseek provides:
//! - SQLite-backed sentence store with batched, transactional writes
//! - Brute-force cosine ranking with thresholding and per-source dedup
//! - Batched ingestion pipeline over any [`query::Embedder`]
//! - Sentence extraction for plain text, CSV, markup and PDF files

pub mod vector;
pub mod storage;
pub mod query;
pub mod ingest;
pub mod extract;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use storage::{SentenceRecord, SentenceStore, StoreStats, WriteBatch};
pub use query::{Embedder, EmbeddingEngine, SearchEngine, SearchOptions, SearchResult};
pub use ingest::{ingest, reindex_folder, IngestOptions, IngestStats};
pub use extract::DocumentExtractor;

/// Result type alias for Docseek operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Docseek operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] rusqlite::Error),

    #[error("Store is closed")]
    StoreClosed,

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Cannot normalize a zero-magnitude vector")]
    DegenerateVector,

    #[error("Malformed record {id}: {reason}")]
    MalformedRecord { id: i64, reason: String },

    #[error("Embedding unavailable: {0}")]
    EmbeddingUnavailable(String),

    #[error("Cannot read document {path}: {reason}")]
    UnreadableDocument { path: String, reason: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
