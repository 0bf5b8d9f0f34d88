//! Embedding generation for similarity search.
//!
//! The provider is a pluggability boundary: anything deterministic and
//! panic-free can sit behind [`EmbeddingProvider`]. The default
//! [`HashEmbedder`] is a token-hash bag — no model download, no network,
//! identical text always maps to the identical vector.

use std::hash::{Hash, Hasher};

use solace_core::{Result, SolaceError};

/// Produces fixed-dimension vectors for similarity search.
///
/// Contract: the dimension is fixed for the provider's lifetime, identical
/// input text yields the identical vector, and failures are reported as
/// errors rather than fabricated vectors.
pub trait EmbeddingProvider: Send + Sync {
    fn dimensions(&self) -> usize;
    fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Deterministic hash-based embedder.
///
/// Each whitespace-separated token is lowercased, hashed, and counted into
/// one of `dims` buckets; the bucket vector is L2-normalized so a text has
/// cosine similarity 1.0 with itself.
pub struct HashEmbedder {
    dims: usize,
}

impl HashEmbedder {
    pub fn new(dims: usize) -> Self {
        Self { dims: dims.max(1) }
    }
}

impl EmbeddingProvider for HashEmbedder {
    fn dimensions(&self) -> usize {
        self.dims
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut buckets = vec![0.0f32; self.dims];
        let mut tokens = 0usize;
        for token in text.split_whitespace() {
            let token = token.to_lowercase();
            let mut hasher = std::collections::hash_map::DefaultHasher::new();
            token.hash(&mut hasher);
            let bucket = (hasher.finish() % self.dims as u64) as usize;
            buckets[bucket] += 1.0;
            tokens += 1;
        }
        if tokens == 0 {
            return Err(SolaceError::Embedding("no tokens in input text".into()));
        }
        let norm: f32 = buckets.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for b in &mut buckets {
                *b /= norm;
            }
        }
        Ok(buckets)
    }
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
