use crate::{Error, Result};
use fastembed::{TextEmbedding, InitOptions, EmbeddingModel};

/// Default local model (384 dimensions)
pub const DEFAULT_MODEL: &str = "all-MiniLM-L6-v2";

/// Source of sentence embeddings.
///
/// Implementations must return vectors of [`Embedder::dimension`] length,
/// and `embed_batch` must return one vector per input, in input order.
pub trait Embedder {
    /// Dimension of every vector this embedder produces
    fn dimension(&self) -> usize;

    /// Embed a single text (used for queries)
    fn embed_one(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed many texts in one call
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Engine for generating text embeddings using local transformer models
pub struct EmbeddingEngine {
    model: TextEmbedding,
    model_name: String,
    dimension: usize,
}

impl EmbeddingEngine {
    /// Create a new embedding engine with the default model
    pub fn new() -> Result<Self> {
        Self::with_model(DEFAULT_MODEL)
    }

    /// Create an embedding engine for a named model.
    ///
    /// The model is downloaded on first use. The output dimension is probed
    /// once here and never changes afterwards.
    pub fn with_model(model_name: &str) -> Result<Self> {
        let options = InitOptions::new(parse_model_name(model_name)?)
            .with_show_download_progress(true);

        let model = TextEmbedding::try_new(options)
            .map_err(|e| Error::EmbeddingUnavailable(format!("Failed to load embedding model: {}", e)))?;

        let dimension = model
            .embed(vec!["dimension probe"], None)
            .map_err(|e| Error::EmbeddingUnavailable(format!("Failed to probe dimensions: {}", e)))?
            .first()
            .map(|v| v.len())
            .ok_or_else(|| Error::EmbeddingUnavailable("Model returned no embedding".to_string()))?;

        tracing::info!("Loaded embedding model {} ({} dimensions)", model_name, dimension);

        Ok(Self {
            model,
            model_name: model_name.to_string(),
            dimension,
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Output dimension of a built-in model, without loading it
    pub fn known_dimension(model_name: &str) -> Option<usize> {
        match parse_model_name(model_name).ok()? {
            EmbeddingModel::AllMiniLML6V2
            | EmbeddingModel::AllMiniLML6V2Q
            | EmbeddingModel::BGESmallENV15 => Some(384),
            EmbeddingModel::BGEBaseENV15 => Some(768),
            EmbeddingModel::BGELargeENV15 => Some(1024),
            _ => None,
        }
    }
}

impl Embedder for EmbeddingEngine {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let mut embeddings = self.model.embed(vec![text], None)
            .map_err(|e| Error::EmbeddingUnavailable(format!("Query embedding failed: {}", e)))?;

        if embeddings.is_empty() {
            return Err(Error::EmbeddingUnavailable("Model returned no embedding".to_string()));
        }
        Ok(embeddings.remove(0))
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        self.model.embed(texts.to_vec(), None)
            .map_err(|e| Error::EmbeddingUnavailable(format!("Embedding generation failed: {}", e)))
    }
}

fn parse_model_name(name: &str) -> Result<EmbeddingModel> {
    match name.to_lowercase().as_str() {
        "all-minilm-l6-v2" | "sentence-transformers/all-minilm-l6-v2" => Ok(EmbeddingModel::AllMiniLML6V2),
        "all-minilm-l6-v2-q" => Ok(EmbeddingModel::AllMiniLML6V2Q),
        "bge-small-en-v1.5" => Ok(EmbeddingModel::BGESmallENV15),
        "bge-base-en-v1.5" => Ok(EmbeddingModel::BGEBaseENV15),
        "bge-large-en-v1.5" => Ok(EmbeddingModel::BGELargeENV15),
        other => Err(Error::InvalidArgument(format!("Unknown embedding model: {}", other))),
    }
}
