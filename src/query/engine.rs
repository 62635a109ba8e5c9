//! Similarity search engine
//!
//! Brute-force cosine ranking over every stored sentence:
//! - normalize the query and every stored embedding to unit length
//! - rank all sentences by cosine distance (`1 - similarity`)
//! - drop everything at or above the distance threshold
//! - keep only the best sentence per source document, up to `limit`

use std::collections::HashSet;
use serde::{Deserialize, Serialize};
use crate::{Error, Result};
use crate::storage::{SentenceRecord, SentenceStore};
use crate::vector;

/// Default maximum number of results
pub const DEFAULT_SEARCH_LIMIT: usize = 5;

/// Default distance cut-off; results must be strictly closer than this
pub const DEFAULT_DISTANCE_THRESHOLD: f64 = 0.7;

/// Per-query search parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    pub limit: usize,
    pub distance_threshold: f64,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_SEARCH_LIMIT,
            distance_threshold: DEFAULT_DISTANCE_THRESHOLD,
        }
    }
}

impl SearchOptions {
    pub fn new(limit: usize, distance_threshold: f64) -> Self {
        Self { limit, distance_threshold }
    }

    fn validate(&self) -> Result<()> {
        if self.limit == 0 {
            return Err(Error::InvalidArgument("search limit must be at least 1".to_string()));
        }
        if !self.distance_threshold.is_finite() || self.distance_threshold < 0.0 {
            return Err(Error::InvalidArgument(format!(
                "distance threshold must be a non-negative number, got {}",
                self.distance_threshold
            )));
        }
        Ok(())
    }
}

/// A ranked match: the best sentence of one source document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub source_path: String,
    pub sentence_text: String,
    /// Cosine distance to the query (lower = more similar)
    pub distance: f64,
}

/// Search engine over a sentence store
pub struct SearchEngine<'a> {
    store: &'a SentenceStore,
}

impl<'a> SearchEngine<'a> {
    /// Create a new search engine
    pub fn new(store: &'a SentenceStore) -> Self {
        Self { store }
    }

    /// Find the source documents whose sentences are closest to `query`.
    ///
    /// Results are ordered by ascending distance, hold at most
    /// `options.limit` entries and at most one entry per `source_path`.
    /// Sentences at equal distance keep storage order.
    pub fn search(&self, query: &[f32], options: &SearchOptions) -> Result<Vec<SearchResult>> {
        let expected = self.store.embedding_dim();
        if query.len() != expected {
            return Err(Error::DimensionMismatch { expected, got: query.len() });
        }
        options.validate()?;

        let query_unit = vector::normalize(query)?;
        let records = self.store.scan_all()?;
        tracing::debug!("Ranking {} stored sentences", records.len());

        Ok(rank(&query_unit, records, options))
    }
}

/// Rank, threshold and deduplicate scanned records against a unit query.
fn rank(query_unit: &[f64], records: Vec<SentenceRecord>, options: &SearchOptions) -> Vec<SearchResult> {
    let mut scored: Vec<SearchResult> = Vec::with_capacity(records.len());
    for record in records {
        let unit = match vector::normalize(&record.embedding) {
            Ok(unit) => unit,
            Err(e) => {
                tracing::warn!(
                    "Skipping record {} from {}: {}",
                    record.id,
                    record.source_path,
                    e
                );
                continue;
            }
        };

        scored.push(SearchResult {
            distance: vector::cosine_distance(query_unit, &unit),
            source_path: record.source_path,
            sentence_text: record.sentence_text,
        });
    }

    // Stable sort: equal distances keep scan order
    scored.sort_by(|a, b| a.distance.total_cmp(&b.distance));

    let mut seen_sources = HashSet::new();
    let mut results = Vec::new();
    for candidate in scored
        .into_iter()
        .filter(|r| r.distance < options.distance_threshold)
    {
        if results.len() >= options.limit {
            break;
        }
        if seen_sources.insert(candidate.source_path.clone()) {
            results.push(candidate);
        }
    }

    results
}
