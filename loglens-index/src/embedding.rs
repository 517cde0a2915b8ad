// Copyright 2025 Loglens Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Embedding capability and the deterministic default backend.

use thiserror::Error;

/// Result alias for embedding operations.
pub type EmbeddingResult<T> = Result<T, EmbeddingError>;

/// Default embedding width, matching the small sentence-embedding models
/// the capability trait is designed around.
pub const DEFAULT_DIMENSION: usize = 384;

/// Errors surfaced by embedding backends.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Backend unreachable (model not loaded, service down).
    #[error("embedding backend unavailable: {0}")]
    Unavailable(String),

    /// Backend produced a vector of the wrong width.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Any other backend failure.
    #[error("embedding failed: {0}")]
    Failed(String),
}

/// The opaque text-to-vector capability.
///
/// Deterministic for a fixed backend, with a fixed output dimension. The
/// index manager never sees anything but this trait.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a batch of texts, one vector per input, in input order.
    fn embed_batch(&self, texts: &[String]) -> EmbeddingResult<Vec<Vec<f32>>>;

    /// Output dimension of every vector this backend produces.
    fn dimension(&self) -> usize;

    /// Embed a single text.
    fn embed(&self, text: &str) -> EmbeddingResult<Vec<f32>> {
        let mut vectors = self.embed_batch(&[text.to_string()])?;
        vectors
            .pop()
            .ok_or_else(|| EmbeddingError::Failed("backend returned no vector".to_string()))
    }
}

/// Deterministic feature-hashing embedder.
///
/// Hashes lower-cased whitespace tokens and their in-token character
/// trigrams into a fixed number of buckets, then L2-normalizes the counts.
/// Not a learned model: it captures lexical overlap, runs fully offline,
/// and is deterministic across processes, which is what the persisted
/// index and the test suite need. A learned backend implements
/// [`EmbeddingProvider`] the same way and drops in unchanged.
pub struct HashEmbeddingProvider {
    dimension: usize,
}

impl Default for HashEmbeddingProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl HashEmbeddingProvider {
    /// Create a provider with the default dimension.
    pub fn new() -> Self {
        Self::with_dimension(DEFAULT_DIMENSION)
    }

    /// Create a provider with a custom dimension.
    pub fn with_dimension(dimension: usize) -> Self {
        debug_assert!(dimension > 0, "embedding dimension must be positive");
        Self { dimension }
    }

    fn bucket(&self, feature: &str) -> usize {
        (seahash::hash(feature.as_bytes()) % self.dimension as u64) as usize
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];

        for token in text.to_lowercase().split_whitespace() {
            vector[self.bucket(token)] += 1.0;
            let chars: Vec<char> = token.chars().collect();
            for window in chars.windows(3) {
                let trigram: String = window.iter().collect();
                vector[self.bucket(&trigram)] += 1.0;
            }
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

impl EmbeddingProvider for HashEmbeddingProvider {
    fn embed_batch(&self, texts: &[String]) -> EmbeddingResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l2(a: &[f32], b: &[f32]) -> f32 {
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f32>()
            .sqrt()
    }

    #[test]
    fn vectors_have_the_configured_dimension() {
        let provider = HashEmbeddingProvider::with_dimension(64);
        let vector = provider.embed("connection refused").unwrap();
        assert_eq!(vector.len(), 64);
        assert_eq!(provider.dimension(), 64);
    }

    #[test]
    fn embedding_is_deterministic() {
        let provider = HashEmbeddingProvider::new();
        let a = provider.embed("Level: ERROR | Message: disk full").unwrap();
        let b = provider.embed("Level: ERROR | Message: disk full").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn batch_preserves_input_order() {
        let provider = HashEmbeddingProvider::new();
        let texts = vec!["first entry".to_string(), "second entry".to_string()];
        let batch = provider.embed_batch(&texts).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0], provider.embed("first entry").unwrap());
        assert_eq!(batch[1], provider.embed("second entry").unwrap());
    }

    #[test]
    fn token_overlap_beats_disjoint_text() {
        let provider = HashEmbeddingProvider::new();
        let base = provider.embed("connection timeout error").unwrap();
        let reordered = provider.embed("error connection timeout").unwrap();
        let unrelated = provider.embed("scheduled backup finished").unwrap();

        // Same token multiset hashes to the same counts.
        assert_eq!(base, reordered);
        assert!(l2(&base, &unrelated) > l2(&base, &reordered));
    }

    #[test]
    fn empty_text_embeds_to_the_zero_vector() {
        let provider = HashEmbeddingProvider::with_dimension(16);
        let vector = provider.embed("").unwrap();
        assert!(vector.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn vectors_are_unit_length() {
        let provider = HashEmbeddingProvider::new();
        let vector = provider.embed("cache invalidation started").unwrap();
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }
}
