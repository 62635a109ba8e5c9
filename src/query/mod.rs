pub mod engine;
pub mod embedding;

pub use engine::{SearchEngine, SearchOptions, SearchResult};
pub use embedding::{Embedder, EmbeddingEngine};
