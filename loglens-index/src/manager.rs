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

//! Index lifecycle: build, persist, restore, query.
//!
//! The manager is the only stateful component of the pipeline. It owns the
//! vector index and its parallel entry metadata, which together form the
//! index's ground truth: `index.len() == entries.len()` always, and the
//! pair is replaced wholesale by `build` and `load`. Single-writer by
//! construction — the mutating operations take `&mut self`, so a
//! concurrent host must wrap the manager in its own lock.

use crate::embedding::{EmbeddingError, EmbeddingProvider};
use crate::flat::{FlatIndex, VectorIndex, VectorIndexError};
use loglens_core::{project, LogEntry};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Vector artifact filename within the data directory.
const VECTOR_ARTIFACT: &str = "index.bin";
/// Metadata artifact filename within the data directory.
const METADATA_ARTIFACT: &str = "entries.json";

/// Result alias for index operations.
pub type IndexResult<T> = Result<T, IndexError>;

/// Errors surfaced by the index lifecycle.
///
/// Read-side persistence failures never appear here: `load` absorbs them
/// into [`LoadOutcome::Failed`] so a damaged index degrades search to
/// empty results instead of crashing the host.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The embedding capability failed or disagreed about dimensions.
    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    /// The index backend rejected an operation.
    #[error("index backend error: {0}")]
    Backend(#[from] VectorIndexError),

    /// Artifact I/O failed (disk full, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Artifact encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Where the artifact pair lives. Explicit configuration, not ambient
/// process state: every manager is rooted at its own directory.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Directory holding the vector and metadata artifacts.
    pub base_dir: PathBuf,
}

impl IndexConfig {
    /// Configuration rooted at the given directory.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn vector_path(&self) -> PathBuf {
        self.base_dir.join(VECTOR_ARTIFACT)
    }

    fn metadata_path(&self) -> PathBuf {
        self.base_dir.join(METADATA_ARTIFACT)
    }
}

/// Lifecycle state of a manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexState {
    /// No index held; search yields empty results.
    Empty,
    /// Index and entries held in memory, not yet durable.
    Built,
    /// Built state that is also durable on disk.
    Persisted,
}

/// Outcome of a [`IndexManager::load`] attempt.
///
/// None of these is an error: a missing or unreadable index is a normal,
/// recoverable condition for the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Both artifacts were read and the in-memory state replaced.
    Loaded,
    /// At least one artifact is missing; state unchanged.
    NotFound,
    /// Artifacts exist but could not be decoded or are inconsistent;
    /// the cause is logged and state unchanged.
    Failed,
}

/// One search result: an entry, its raw L2 distance (smaller is more
/// similar), and its 1-based rank.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub entry: LogEntry,
    pub distance: f32,
    pub rank: usize,
}

/// Owner of the embedding lifecycle and the persisted index pair.
pub struct IndexManager<P: EmbeddingProvider, I: VectorIndex = FlatIndex> {
    provider: Arc<P>,
    config: IndexConfig,
    index: Option<I>,
    entries: Vec<LogEntry>,
    persisted: bool,
}

impl<P: EmbeddingProvider, I: VectorIndex> IndexManager<P, I> {
    /// Create an empty manager rooted at the configured directory, which
    /// is created if missing (idempotent).
    pub fn new(provider: Arc<P>, config: IndexConfig) -> IndexResult<Self> {
        fs::create_dir_all(&config.base_dir)?;
        Ok(Self {
            provider,
            config,
            index: None,
            entries: Vec::new(),
            persisted: false,
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> IndexState {
        match (&self.index, self.persisted) {
            (None, _) => IndexState::Empty,
            (Some(_), false) => IndexState::Built,
            (Some(_), true) => IndexState::Persisted,
        }
    }

    /// Number of indexed entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Indexed entries, in insertion order.
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Build a fresh index from a batch of entries, replacing any previous
    /// one wholesale.
    ///
    /// Projects every entry to its canonical text and embeds the whole
    /// batch in a single call, blocking until the backend returns; hosts
    /// with latency-sensitive threads schedule this elsewhere. State is
    /// only mutated once the new index is complete, so a failed build
    /// leaves the previous index intact.
    pub fn build(&mut self, entries: Vec<LogEntry>) -> IndexResult<usize> {
        let texts: Vec<String> = entries.iter().map(project).collect();
        let vectors = self.provider.embed_batch(&texts)?;

        if vectors.len() != entries.len() {
            return Err(EmbeddingError::Failed(format!(
                "backend returned {} vectors for {} texts",
                vectors.len(),
                entries.len()
            ))
            .into());
        }
        let expected = self.provider.dimension();
        for vector in &vectors {
            if vector.len() != expected {
                return Err(EmbeddingError::DimensionMismatch {
                    expected,
                    actual: vector.len(),
                }
                .into());
            }
        }

        let mut index = I::with_dimension(expected);
        index.add(vectors)?;

        let count = entries.len();
        self.index = Some(index);
        self.entries = entries;
        self.persisted = false;
        info!(count, "built semantic index");
        Ok(count)
    }

    /// Persist the artifact pair, returning `Ok(false)` as a no-op when
    /// nothing has been built.
    ///
    /// Both artifacts are staged as temp files and renamed into place only
    /// after both writes succeed; a failure between the two renames is the
    /// accepted residual inconsistency window.
    pub fn save(&mut self) -> IndexResult<bool> {
        let Some(index) = &self.index else {
            debug!("save skipped: nothing built");
            return Ok(false);
        };

        let index_bytes = index.to_bytes()?;
        let metadata_bytes = serde_json::to_vec_pretty(&self.entries)
            .map_err(|e| IndexError::Serialization(e.to_string()))?;

        let vector_path = self.config.vector_path();
        let metadata_path = self.config.metadata_path();
        let vector_tmp = vector_path.with_extension("bin.tmp");
        let metadata_tmp = metadata_path.with_extension("json.tmp");

        fs::write(&vector_tmp, index_bytes)?;
        fs::write(&metadata_tmp, metadata_bytes)?;
        fs::rename(&vector_tmp, &vector_path)?;
        fs::rename(&metadata_tmp, &metadata_path)?;

        self.persisted = true;
        info!(
            count = self.entries.len(),
            dir = %self.config.base_dir.display(),
            "saved index artifacts"
        );
        Ok(true)
    }

    /// Restore a previously saved index, replacing the in-memory state
    /// wholesale on success.
    ///
    /// Missing artifacts report [`LoadOutcome::NotFound`]; anything
    /// undecodable or inconsistent reports [`LoadOutcome::Failed`] with
    /// the cause logged. Neither path panics or returns an error: index
    /// unavailability degrades search to empty results.
    pub fn load(&mut self) -> LoadOutcome {
        let vector_path = self.config.vector_path();
        let metadata_path = self.config.metadata_path();
        if !vector_path.exists() || !metadata_path.exists() {
            return LoadOutcome::NotFound;
        }

        match self.try_load(&vector_path, &metadata_path) {
            Ok((index, entries)) => {
                self.index = Some(index);
                self.entries = entries;
                self.persisted = true;
                info!(count = self.entries.len(), "loaded index artifacts");
                LoadOutcome::Loaded
            }
            Err(e) => {
                warn!(
                    error = %e,
                    dir = %self.config.base_dir.display(),
                    "failed to load index artifacts"
                );
                LoadOutcome::Failed
            }
        }
    }

    fn try_load(&self, vector_path: &Path, metadata_path: &Path) -> IndexResult<(I, Vec<LogEntry>)> {
        let index = I::from_bytes(&fs::read(vector_path)?)?;
        let entries: Vec<LogEntry> = serde_json::from_slice(&fs::read(metadata_path)?)
            .map_err(|e| IndexError::Serialization(e.to_string()))?;

        // The pair is only valid as a pair.
        if index.len() != entries.len() {
            return Err(IndexError::Serialization(format!(
                "artifact pair out of sync: {} vectors, {} entries",
                index.len(),
                entries.len()
            )));
        }
        if index.dimension() != self.provider.dimension() {
            return Err(IndexError::Serialization(format!(
                "index dimension {} does not match embedding dimension {}",
                index.dimension(),
                self.provider.dimension()
            )));
        }
        Ok((index, entries))
    }

    /// Query for the `top_k` most similar entries, closest first.
    ///
    /// Fail-soft on absence: an unbuilt index or `top_k == 0` yields an
    /// empty result without touching the embedding backend. Only a
    /// genuinely failing backend surfaces an error.
    pub fn search(&self, query_text: &str, top_k: usize) -> IndexResult<Vec<SearchHit>> {
        if top_k == 0 {
            return Ok(Vec::new());
        }
        let Some(index) = &self.index else {
            return Ok(Vec::new());
        };

        let query = self.provider.embed(query_text)?;
        let k = top_k.min(self.entries.len());
        let hits = index
            .search(&query, k)
            .into_iter()
            .enumerate()
            .map(|(i, (idx, distance))| SearchHit {
                entry: self.entries[idx].clone(),
                distance,
                rank: i + 1,
            })
            .collect();
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::{EmbeddingResult, HashEmbeddingProvider};
    use loglens_core::parse_text;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts embedding calls so tests can assert the backend was not hit.
    struct CountingProvider {
        inner: HashEmbeddingProvider,
        calls: AtomicUsize,
    }

    impl CountingProvider {
        fn new() -> Self {
            Self {
                inner: HashEmbeddingProvider::with_dimension(32),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl EmbeddingProvider for CountingProvider {
        fn embed_batch(&self, texts: &[String]) -> EmbeddingResult<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.embed_batch(texts)
        }

        fn dimension(&self) -> usize {
            self.inner.dimension()
        }
    }

    /// Always-down backend.
    struct FailingProvider;

    impl EmbeddingProvider for FailingProvider {
        fn embed_batch(&self, _texts: &[String]) -> EmbeddingResult<Vec<Vec<f32>>> {
            Err(EmbeddingError::Unavailable("model offline".to_string()))
        }

        fn dimension(&self) -> usize {
            32
        }
    }

    fn manager_in(
        dir: &tempfile::TempDir,
    ) -> IndexManager<HashEmbeddingProvider, FlatIndex> {
        IndexManager::new(
            Arc::new(HashEmbeddingProvider::with_dimension(32)),
            IndexConfig::new(dir.path()),
        )
        .unwrap()
    }

    fn sample_entries() -> Vec<LogEntry> {
        parse_text(
            "2024-01-01T10:00:00Z [ERROR] disk full\n\
             2024-01-01T10:00:01Z [INFO] request served\n\
             WARNING: retrying connection\n\
             just some text\n",
        )
    }

    #[test]
    fn search_on_empty_manager_returns_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_in(&dir);
        assert_eq!(manager.state(), IndexState::Empty);
        assert!(manager.search("disk full", 5).unwrap().is_empty());
    }

    #[test]
    fn zero_top_k_skips_the_embedding_backend() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(CountingProvider::new());
        let mut manager: IndexManager<CountingProvider, FlatIndex> =
            IndexManager::new(Arc::clone(&provider), IndexConfig::new(dir.path())).unwrap();
        manager.build(sample_entries()).unwrap();
        let calls_after_build = provider.calls();

        assert!(manager.search("anything", 0).unwrap().is_empty());
        assert_eq!(provider.calls(), calls_after_build);
    }

    #[test]
    fn build_then_search_ranks_the_matching_entry_first() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = manager_in(&dir);
        let count = manager.build(sample_entries()).unwrap();
        assert_eq!(count, 4);
        assert_eq!(manager.state(), IndexState::Built);

        let hits = manager.search("disk full error", 2).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].rank, 1);
        assert_eq!(hits[0].entry.message, "disk full");
        assert!(hits[0].distance <= hits[1].distance);
    }

    #[test]
    fn top_k_is_clamped_to_entry_count() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = manager_in(&dir);
        manager.build(sample_entries()).unwrap();
        assert_eq!(manager.search("anything", 100).unwrap().len(), 4);
    }

    #[test]
    fn rebuild_replaces_the_previous_index_wholesale() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = manager_in(&dir);
        manager.build(sample_entries()).unwrap();
        manager.build(parse_text("INFO: only one\n")).unwrap();
        assert_eq!(manager.len(), 1);
        assert_eq!(manager.search("anything", 10).unwrap().len(), 1);
    }

    #[test]
    fn failed_build_leaves_previous_state_intact() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager: IndexManager<FailingProvider, FlatIndex> =
            IndexManager::new(Arc::new(FailingProvider), IndexConfig::new(dir.path())).unwrap();

        let err = manager.build(sample_entries()).unwrap_err();
        assert!(matches!(err, IndexError::Embedding(_)));
        assert_eq!(manager.state(), IndexState::Empty);
        assert!(manager.is_empty());
    }

    #[test]
    fn save_on_empty_manager_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = manager_in(&dir);
        assert!(!manager.save().unwrap());
        assert!(!dir.path().join("index.bin").exists());
        assert!(!dir.path().join("entries.json").exists());
    }

    #[test]
    fn save_marks_the_state_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = manager_in(&dir);
        manager.build(sample_entries()).unwrap();
        assert!(manager.save().unwrap());
        assert_eq!(manager.state(), IndexState::Persisted);
        assert!(dir.path().join("index.bin").exists());
        assert!(dir.path().join("entries.json").exists());
    }

    #[test]
    fn load_from_empty_directory_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = manager_in(&dir);
        assert_eq!(manager.load(), LoadOutcome::NotFound);
        assert_eq!(manager.state(), IndexState::Empty);
    }
}
