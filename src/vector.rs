//! Embedding vector helpers
//!
//! Embeddings are persisted as a little-endian `f32` blob. Ranking works on
//! unit vectors computed in `f64` so that long, unnormalized embeddings do
//! not lose precision before the dot product.

use crate::{Error, Result};

/// Size in bytes of one encoded component
const COMPONENT_BYTES: usize = std::mem::size_of::<f32>();

/// Encode a vector as a little-endian `f32` blob
pub fn encode(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Decode a blob written by [`encode`], checking it holds exactly `dim`
/// finite components.
///
/// The error string describes what is wrong with the blob; callers attach
/// the record id.
pub fn decode(blob: &[u8], dim: usize) -> std::result::Result<Vec<f32>, String> {
    if blob.len() % COMPONENT_BYTES != 0 {
        return Err(format!("blob length {} is not a multiple of {}", blob.len(), COMPONENT_BYTES));
    }

    let got = blob.len() / COMPONENT_BYTES;
    if got != dim {
        return Err(format!("expected {} components, found {}", dim, got));
    }

    let vector: Vec<f32> = blob
        .chunks_exact(COMPONENT_BYTES)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();

    if let Some(pos) = vector.iter().position(|v| !v.is_finite()) {
        return Err(format!("component {} is not a finite number", pos));
    }

    Ok(vector)
}

/// Euclidean length of a vector
pub fn magnitude(vector: &[f32]) -> f64 {
    vector.iter().map(|&x| (x as f64) * (x as f64)).sum::<f64>().sqrt()
}

/// Scale a vector to unit length.
///
/// Fails with [`Error::DegenerateVector`] when the magnitude is zero or not
/// finite.
pub fn normalize(vector: &[f32]) -> Result<Vec<f64>> {
    let norm = magnitude(vector);
    if norm == 0.0 || !norm.is_finite() {
        return Err(Error::DegenerateVector);
    }
    Ok(vector.iter().map(|&x| x as f64 / norm).collect())
}

/// Cosine distance between two unit vectors of equal length.
///
/// Rounding can push the dot product of near-identical unit vectors just
/// past 1.0, so the similarity is clamped to keep the distance in `[0, 2]`.
pub fn cosine_distance(a: &[f64], b: &[f64]) -> f64 {
    let similarity: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    1.0 - similarity.clamp(-1.0, 1.0)
}
