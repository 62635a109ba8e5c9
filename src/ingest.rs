//! Ingestion pipeline
//!
//! Pulls `(source_path, sentence_text)` pairs, embeds them in fixed-size
//! batches and writes each batch to the store in one transaction.
//!
//! If the embedder fails, the run aborts with
//! [`Error::EmbeddingUnavailable`]: the failing batch is never written,
//! batches committed before it stay in the store.
//!
//! [`reindex_folder`] wraps extraction, clearing and ingestion for a full
//! rebuild of the store from one folder.

use std::collections::HashSet;
use std::path::Path;
use crossbeam::channel::Sender;
use serde::{Deserialize, Serialize};
use crate::{Error, Result};
use crate::query::Embedder;
use crate::extract::DocumentExtractor;
use crate::storage::SentenceStore;
use crate::ui::{ProgressMessage, ProgressPhase};

/// Default number of sentences per embedding call
pub const DEFAULT_BATCH_SIZE: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestOptions {
    pub batch_size: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self { batch_size: DEFAULT_BATCH_SIZE }
    }
}

impl IngestOptions {
    fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::InvalidArgument("batch size must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Totals for one ingestion run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub sentences: usize,
    pub batches: usize,
    pub sources: usize,
}

/// Embed and store every pair produced by `pairs`.
///
/// The store must already be open, and cleared by the caller if this is a
/// re-index. Cumulative progress is sent on `progress` after each committed
/// batch.
pub fn ingest<I, E>(
    pairs: I,
    embedder: &E,
    store: &mut SentenceStore,
    options: &IngestOptions,
    progress: Option<&Sender<ProgressMessage>>,
) -> Result<IngestStats>
where
    I: IntoIterator<Item = (String, String)>,
    E: Embedder + ?Sized,
{
    options.validate()?;

    let mut stats = IngestStats::default();
    let mut sources = HashSet::new();
    let mut pairs = pairs.into_iter();

    loop {
        let batch: Vec<(String, String)> = pairs.by_ref().take(options.batch_size).collect();
        if batch.is_empty() {
            break;
        }

        let (paths, sentences): (Vec<String>, Vec<String>) = batch.into_iter().unzip();
        let embeddings = embedder.embed_batch(&sentences)?;
        if embeddings.len() != sentences.len() {
            return Err(Error::EmbeddingUnavailable(format!(
                "embedder returned {} vectors for {} sentences",
                embeddings.len(),
                sentences.len()
            )));
        }

        let mut writer = store.begin_batch()?;
        for ((path, sentence), embedding) in paths.iter().zip(&sentences).zip(&embeddings) {
            writer.insert(path, sentence, embedding)?;
        }
        writer.commit()?;

        stats.sentences += sentences.len();
        stats.batches += 1;
        sources.extend(paths);

        tracing::debug!("Batch {} committed ({} sentences so far)", stats.batches, stats.sentences);
        if let Some(tx) = progress {
            tx.send(ProgressMessage::Progress {
                phase: ProgressPhase::Embedding,
                current: stats.sentences,
                file: None,
            })
            .ok();
        }
    }

    stats.sources = sources.len();
    tracing::info!(
        "Ingested {} sentences from {} documents in {} batches",
        stats.sentences,
        stats.sources,
        stats.batches
    );
    Ok(stats)
}

/// Rebuild the store from the documents under `folder`.
///
/// The folder is scanned before anything is deleted: a missing folder or
/// invalid options leave the current records in place. Once extraction
/// succeeds the store is cleared and every sentence is ingested.
pub fn reindex_folder<E>(
    folder: &Path,
    extractor: &DocumentExtractor,
    embedder: &E,
    store: &mut SentenceStore,
    options: &IngestOptions,
    progress: Option<&Sender<ProgressMessage>>,
) -> Result<IngestStats>
where
    E: Embedder + ?Sized,
{
    options.validate()?;
    let pairs = extractor.scan_folder(folder, progress)?;

    store.clear()?;
    if pairs.is_empty() {
        tracing::debug!("Nothing to ingest under {}", folder.display());
        return Ok(IngestStats::default());
    }

    if let Some(tx) = progress {
        tx.send(ProgressMessage::Started { phase: ProgressPhase::Embedding, total: pairs.len() }).ok();
    }
    let stats = ingest(pairs, embedder, store, options, progress)?;
    if let Some(tx) = progress {
        tx.send(ProgressMessage::Finished { phase: ProgressPhase::Embedding }).ok();
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    /// Embeds each sentence as `[len, 1.0]`; optionally fails on a given call
    struct FakeEmbedder {
        calls: RefCell<Vec<usize>>,
        fail_on_call: Option<usize>,
        short_on_call: Option<usize>,
    }

    impl FakeEmbedder {
        fn new() -> Self {
            Self { calls: RefCell::new(Vec::new()), fail_on_call: None, short_on_call: None }
        }
    }

    impl Embedder for FakeEmbedder {
        fn dimension(&self) -> usize {
            2
        }

        fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
            Ok(vec![text.len() as f32, 1.0])
        }

        fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            let call = self.calls.borrow().len();
            self.calls.borrow_mut().push(texts.len());
            if self.fail_on_call == Some(call) {
                return Err(Error::EmbeddingUnavailable("model crashed".to_string()));
            }
            let mut out: Vec<Vec<f32>> = texts.iter().map(|t| vec![t.len() as f32, 1.0]).collect();
            if self.short_on_call == Some(call) {
                out.pop();
            }
            Ok(out)
        }
    }

    fn pairs(n: usize) -> Vec<(String, String)> {
        (0..n)
            .map(|i| (format!("doc{}.txt", i % 3), format!("Sentence number {}", i)))
            .collect()
    }

    #[test]
    fn test_batches_and_stats() {
        let mut store = SentenceStore::open_in_memory(2).unwrap();
        let embedder = FakeEmbedder::new();

        let stats = ingest(pairs(70), &embedder, &mut store, &IngestOptions::default(), None).unwrap();

        assert_eq!(*embedder.calls.borrow(), vec![32, 32, 6]);
        assert_eq!(stats, IngestStats { sentences: 70, batches: 3, sources: 3 });
        assert_eq!(store.count().unwrap(), 70);
    }

    #[test]
    fn test_preserves_pair_order() {
        let mut store = SentenceStore::open_in_memory(2).unwrap();
        let embedder = FakeEmbedder::new();
        let input = pairs(5);

        ingest(input.clone(), &embedder, &mut store, &IngestOptions { batch_size: 2 }, None).unwrap();

        let records = store.scan_all().unwrap();
        let stored: Vec<_> = records
            .iter()
            .map(|r| (r.source_path.clone(), r.sentence_text.clone()))
            .collect();
        assert_eq!(stored, input);
        assert_eq!(records[0].embedding, vec!["Sentence number 0".len() as f32, 1.0]);
    }

    #[test]
    fn test_empty_input() {
        let mut store = SentenceStore::open_in_memory(2).unwrap();
        let embedder = FakeEmbedder::new();

        let stats = ingest(Vec::<(String, String)>::new(), &embedder, &mut store, &IngestOptions::default(), None).unwrap();

        assert_eq!(stats, IngestStats::default());
        assert!(embedder.calls.borrow().is_empty());
    }

    #[test]
    fn test_embedder_failure_aborts_run() {
        let mut store = SentenceStore::open_in_memory(2).unwrap();
        let embedder = FakeEmbedder { fail_on_call: Some(1), ..FakeEmbedder::new() };

        let result = ingest(pairs(10), &embedder, &mut store, &IngestOptions { batch_size: 4 }, None);

        assert!(matches!(result, Err(Error::EmbeddingUnavailable(_))));
        // First batch committed, failing batch never written, third never attempted
        assert_eq!(store.count().unwrap(), 4);
        assert_eq!(embedder.calls.borrow().len(), 2);
    }

    #[test]
    fn test_short_embedding_response_aborts_without_partial_batch() {
        let mut store = SentenceStore::open_in_memory(2).unwrap();
        let embedder = FakeEmbedder { short_on_call: Some(0), ..FakeEmbedder::new() };

        let result = ingest(pairs(3), &embedder, &mut store, &IngestOptions::default(), None);

        assert!(matches!(result, Err(Error::EmbeddingUnavailable(_))));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_wrong_dimension_rolls_back_batch() {
        struct WideEmbedder;
        impl Embedder for WideEmbedder {
            fn dimension(&self) -> usize {
                3
            }
            fn embed_one(&self, _text: &str) -> Result<Vec<f32>> {
                Ok(vec![1.0, 0.0, 0.0])
            }
            fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
                Ok(texts.iter().map(|_| vec![1.0, 0.0, 0.0]).collect())
            }
        }

        let mut store = SentenceStore::open_in_memory(2).unwrap();
        let result = ingest(pairs(3), &WideEmbedder, &mut store, &IngestOptions::default(), None);

        assert!(matches!(result, Err(Error::DimensionMismatch { expected: 2, got: 3 })));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let mut store = SentenceStore::open_in_memory(2).unwrap();
        let embedder = FakeEmbedder::new();
        let result = ingest(pairs(1), &embedder, &mut store, &IngestOptions { batch_size: 0 }, None);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_reports_cumulative_progress() {
        let mut store = SentenceStore::open_in_memory(2).unwrap();
        let embedder = FakeEmbedder::new();
        let (tx, rx) = crossbeam::channel::unbounded();

        ingest(pairs(7), &embedder, &mut store, &IngestOptions { batch_size: 3 }, Some(&tx)).unwrap();
        drop(tx);

        let reported: Vec<usize> = rx
            .iter()
            .filter_map(|msg| match msg {
                ProgressMessage::Progress { phase: ProgressPhase::Embedding, current, .. } => Some(current),
                _ => None,
            })
            .collect();
        assert_eq!(reported, vec![3, 6, 7]);
    }

    #[test]
    fn test_pulls_pairs_lazily() {
        let mut store = SentenceStore::open_in_memory(2).unwrap();
        let embedder = FakeEmbedder { fail_on_call: Some(0), ..FakeEmbedder::new() };
        let pulled = Cell::new(0usize);
        let source = (0..100).map(|i| {
            pulled.set(pulled.get() + 1);
            ("lazy.txt".to_string(), format!("Lazy sentence {}", i))
        });

        let result = ingest(source, &embedder, &mut store, &IngestOptions { batch_size: 10 }, None);

        assert!(result.is_err());
        assert_eq!(pulled.get(), 10);
    }

    fn seeded_store() -> SentenceStore {
        let store = SentenceStore::open_in_memory(2).unwrap();
        store.insert("old.txt", "An older indexed sentence.", &[1.0, 0.0]).unwrap();
        store.insert("old.txt", "Another older sentence.", &[0.0, 1.0]).unwrap();
        store
    }

    #[test]
    fn test_reindex_missing_folder_keeps_records() {
        let mut store = seeded_store();
        let embedder = FakeEmbedder::new();
        let dir = tempfile::tempdir().unwrap();

        let result = reindex_folder(
            &dir.path().join("tpyo"),
            &DocumentExtractor::new(),
            &embedder,
            &mut store,
            &IngestOptions::default(),
            None,
        );

        assert!(matches!(result, Err(Error::Io(_))));
        assert_eq!(store.count().unwrap(), 2);
        assert!(embedder.calls.borrow().is_empty());
    }

    #[test]
    fn test_reindex_bad_options_keeps_records() {
        let mut store = seeded_store();
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "Dogs are loyal companions.").unwrap();

        let result = reindex_folder(
            dir.path(),
            &DocumentExtractor::new(),
            &FakeEmbedder::new(),
            &mut store,
            &IngestOptions { batch_size: 0 },
            None,
        );

        assert!(matches!(result, Err(Error::InvalidArgument(_))));
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_reindex_replaces_previous_records() {
        let mut store = seeded_store();
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "Dogs are loyal companions. Cats sleep all day.").unwrap();
        let (tx, rx) = crossbeam::channel::unbounded();

        let stats = reindex_folder(
            dir.path(),
            &DocumentExtractor::new(),
            &FakeEmbedder::new(),
            &mut store,
            &IngestOptions::default(),
            Some(&tx),
        )
        .unwrap();
        drop(tx);

        assert_eq!(stats, IngestStats { sentences: 2, batches: 1, sources: 1 });
        let texts: Vec<_> = store.scan_all().unwrap().into_iter().map(|r| r.sentence_text).collect();
        assert_eq!(texts, vec!["Dogs are loyal companions.", "Cats sleep all day."]);

        let messages: Vec<_> = rx.iter().collect();
        assert!(messages.iter().any(|m| matches!(
            m,
            ProgressMessage::Started { phase: ProgressPhase::Embedding, total: 2 }
        )));
        assert!(matches!(messages.last(), Some(ProgressMessage::Finished { phase: ProgressPhase::Embedding })));
    }

    #[test]
    fn test_reindex_empty_folder_clears_store() {
        let mut store = seeded_store();
        let dir = tempfile::tempdir().unwrap();

        let stats = reindex_folder(
            dir.path(),
            &DocumentExtractor::new(),
            &FakeEmbedder::new(),
            &mut store,
            &IngestOptions::default(),
            None,
        )
        .unwrap();

        assert_eq!(stats, IngestStats::default());
        assert_eq!(store.count().unwrap(), 0);
    }
}
