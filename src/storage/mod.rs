//! Storage Layer - SQLite-backed persistence
//!
//! System of record is a single SQLite table:
//! - sentences(id, source_path, sentence_text, embedding)
//!
//! Embeddings are stored as little-endian `f32` blobs (see [`crate::vector`]).

pub mod schema;
pub mod sqlite;

pub use sqlite::{SentenceRecord, SentenceStore, StoreStats, WriteBatch};
