//! Database and index configuration.

use std::path::PathBuf;

/// Configuration for a [`VectorDb`](crate::VectorDb).
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the persisted collections. `None` keeps everything in memory.
    pub data_path: Option<PathBuf>,

    /// HNSW parameters used for every collection created by this database.
    pub hnsw: HnswConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: None,
            hnsw: HnswConfig::default(),
        }
    }
}

impl Config {
    /// In-memory database; nothing touches the disk.
    pub fn memory() -> Self {
        Self::default()
    }

    /// Database persisted under `path`, reloaded on [`VectorDb::open`](crate::VectorDb::open).
    pub fn persistent<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            data_path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Replace the HNSW parameters.
    pub fn with_hnsw(mut self, hnsw: HnswConfig) -> Self {
        self.hnsw = hnsw;
        self
    }
}

/// HNSW graph parameters.
///
/// A document folder rarely produces more than a few thousand chunks, so the
/// defaults lean towards recall rather than build speed.
#[derive(Debug, Clone, PartialEq)]
pub struct HnswConfig {
    /// Maximum connections per node per layer. Typical values: 12-48.
    pub m: usize,

    /// Candidate list size while building the graph.
    pub ef_construction: usize,

    /// Candidate list size while searching. Raised to `limit` when smaller.
    pub ef_search: usize,

    /// Upper bound on vectors per collection.
    pub max_elements: usize,

    /// Insert batches with `parallel_insert`.
    pub parallel_construction: bool,
}

impl Default for HnswConfig {
    fn default() -> Self {
        Self {
            m: 16,
            ef_construction: 200,
            ef_search: 100,
            max_elements: 100_000,
            parallel_construction: true,
        }
    }
}

impl HnswConfig {
    /// Set `m`.
    pub fn with_m(mut self, m: usize) -> Self {
        self.m = m;
        self
    }

    /// Set `ef_search`.
    pub fn with_ef_search(mut self, ef: usize) -> Self {
        self.ef_search = ef;
        self
    }

    /// Set the per-collection capacity.
    pub fn with_max_elements(mut self, max: usize) -> Self {
        self.max_elements = max;
        self
    }
}
