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

//! Exact nearest-neighbor index capability and its flat implementation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from vector index operations.
#[derive(Debug, Error)]
pub enum VectorIndexError {
    /// A vector of the wrong width was offered.
    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Binary round trip failed.
    #[error("index serialization failed: {0}")]
    Serialization(String),
}

/// Nearest-neighbor index capability.
///
/// Alternate backends (approximate structures included) implement this
/// trait; the index manager's state machine never depends on the internal
/// algorithm, only on these operations.
pub trait VectorIndex: Send + Sync + Sized {
    /// Create an empty index for vectors of the given width.
    fn with_dimension(dimension: usize) -> Self;

    /// Fixed vector width of this index.
    fn dimension(&self) -> usize;

    /// Number of stored vectors.
    fn len(&self) -> usize;

    /// Whether the index holds no vectors.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append vectors in order.
    fn add(&mut self, vectors: Vec<Vec<f32>>) -> Result<(), VectorIndexError>;

    /// The `k` nearest stored vectors by L2 distance, ascending, as
    /// `(insertion index, distance)` pairs; ties keep insertion order.
    fn search(&self, query: &[f32], k: usize) -> Vec<(usize, f32)>;

    /// Binary serialization that round-trips count, dimension, and every
    /// vector bit-for-bit.
    fn to_bytes(&self) -> Result<Vec<u8>, VectorIndexError>;

    /// Inverse of [`VectorIndex::to_bytes`].
    fn from_bytes(bytes: &[u8]) -> Result<Self, VectorIndexError>;
}

/// Exact brute-force L2 index.
///
/// Compares the query against every stored vector; no approximation, fully
/// deterministic, which also makes tie order stable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatIndex {
    dimension: usize,
    vectors: Vec<Vec<f32>>,
}

fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

impl VectorIndex for FlatIndex {
    fn with_dimension(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: Vec::new(),
        }
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn len(&self) -> usize {
        self.vectors.len()
    }

    fn add(&mut self, vectors: Vec<Vec<f32>>) -> Result<(), VectorIndexError> {
        for vector in &vectors {
            if vector.len() != self.dimension {
                return Err(VectorIndexError::DimensionMismatch {
                    expected: self.dimension,
                    actual: vector.len(),
                });
            }
        }
        self.vectors.extend(vectors);
        Ok(())
    }

    fn search(&self, query: &[f32], k: usize) -> Vec<(usize, f32)> {
        debug_assert_eq!(query.len(), self.dimension);

        let mut hits: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .map(|v| l2_distance(query, v))
            .enumerate()
            .collect();
        // Stable sort keeps insertion order among equal distances.
        hits.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(k);
        hits
    }

    fn to_bytes(&self) -> Result<Vec<u8>, VectorIndexError> {
        bincode::serialize(self).map_err(|e| VectorIndexError::Serialization(e.to_string()))
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, VectorIndexError> {
        bincode::deserialize(bytes).map_err(|e| VectorIndexError::Serialization(e.to_string()))
    }
}
