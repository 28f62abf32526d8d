//! HNSW index over `hnsw_rs` with string ids and stored vectors.
//!
//! `hnsw_rs` only knows numeric point ids and cannot remove points, so the
//! index keeps its own id map and the raw vectors. A replaced point stays in
//! the graph as a tombstone that searches skip.

use crate::config::HnswConfig;
use crate::distance::DistanceMetric;
use crate::error::{Error, Result};
use crate::types::{SearchResult, StoredVector, VectorId, VectorMetadata};
use anndists::dist::distances::{DistCosine, DistL2};
use hnsw_rs::hnsw::Hnsw;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{debug, trace};

const MAX_LAYER: usize = 16;

/// Thread-safe HNSW index keyed by string ids.
pub struct HnswIndex {
    state: RwLock<IndexState>,
    dimensions: usize,
    metric: DistanceMetric,
    config: HnswConfig,
}

struct IndexState {
    graph: Graph,
    /// external id -> live internal id
    ids: HashMap<VectorId, usize>,
    /// live internal id -> entry
    entries: HashMap<usize, Entry>,
    next_internal: usize,
    /// points still in the graph but no longer live
    tombstones: usize,
}

struct Entry {
    id: VectorId,
    vector: Vec<f32>,
    metadata: Option<VectorMetadata>,
}

enum Graph {
    Cosine(Hnsw<'static, f32, DistCosine>),
    Euclidean(Hnsw<'static, f32, DistL2>),
}

impl Graph {
    fn new(metric: DistanceMetric, config: &HnswConfig) -> Self {
        match metric {
            DistanceMetric::Cosine => Graph::Cosine(Hnsw::new(
                config.m,
                config.max_elements,
                MAX_LAYER,
                config.ef_construction,
                DistCosine {},
            )),
            DistanceMetric::Euclidean => Graph::Euclidean(Hnsw::new(
                config.m,
                config.max_elements,
                MAX_LAYER,
                config.ef_construction,
                DistL2 {},
            )),
        }
    }

    fn insert(&self, vector: &[f32], internal_id: usize) {
        match self {
            Graph::Cosine(hnsw) => hnsw.insert((vector, internal_id)),
            Graph::Euclidean(hnsw) => hnsw.insert((vector, internal_id)),
        }
    }

    fn insert_many(&self, batch: &[(&Vec<f32>, usize)], parallel: bool) {
        if parallel {
            match self {
                Graph::Cosine(hnsw) => hnsw.parallel_insert(batch),
                Graph::Euclidean(hnsw) => hnsw.parallel_insert(batch),
            }
        } else {
            for (vector, id) in batch {
                self.insert(vector, *id);
            }
        }
    }

    /// `(internal id, distance)` pairs, closest first.
    fn search(&self, query: &[f32], k: usize, ef: usize) -> Vec<(usize, f32)> {
        let neighbours = match self {
            Graph::Cosine(hnsw) => hnsw.search(query, k, ef),
            Graph::Euclidean(hnsw) => hnsw.search(query, k, ef),
        };
        neighbours
            .into_iter()
            .map(|n| (n.d_id, n.distance))
            .collect()
    }
}

impl HnswIndex {
    /// Create an empty index.
    pub fn new(dimensions: usize, metric: DistanceMetric, config: HnswConfig) -> Result<Self> {
        if dimensions == 0 {
            return Err(Error::InvalidVector("Dimensions must be > 0".to_string()));
        }

        Ok(Self {
            state: RwLock::new(IndexState {
                graph: Graph::new(metric, &config),
                ids: HashMap::new(),
                entries: HashMap::new(),
                next_internal: 0,
                tombstones: 0,
            }),
            dimensions,
            metric,
            config,
        })
    }

    /// Vector dimensions.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Distance metric.
    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Number of live vectors.
    pub fn len(&self) -> usize {
        self.state.read().ids.len()
    }

    /// True when no live vectors remain.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if `id` is live.
    pub fn contains(&self, id: &str) -> bool {
        self.state.read().ids.contains_key(id)
    }

    fn validate(&self, id: &str, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimensions {
            return Err(Error::DimensionMismatch {
                expected: self.dimensions,
                actual: vector.len(),
            });
        }
        if vector.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidVector(format!(
                "Vector '{}' contains NaN or Inf",
                id
            )));
        }
        Ok(())
    }

    /// Reserve an internal id for `id`, retiring the previous point if any.
    fn assign(&self, state: &mut IndexState, entry: Entry) -> Result<usize> {
        if state.next_internal >= self.config.max_elements {
            return Err(Error::CapacityExceeded {
                capacity: self.config.max_elements,
            });
        }

        let internal_id = state.next_internal;
        state.next_internal += 1;

        if let Some(previous) = state.ids.insert(entry.id.clone(), internal_id) {
            state.entries.remove(&previous);
            state.tombstones += 1;
        }
        state.entries.insert(internal_id, entry);
        Ok(internal_id)
    }

    /// Insert a vector, replacing any vector stored under the same id.
    pub fn insert(&self, id: &str, vector: &[f32], metadata: Option<VectorMetadata>) -> Result<()> {
        self.validate(id, vector)?;

        let mut state = self.state.write();
        let internal_id = self.assign(
            &mut state,
            Entry {
                id: id.to_string(),
                vector: vector.to_vec(),
                metadata,
            },
        )?;
        state.graph.insert(vector, internal_id);

        trace!(id, internal_id, "Inserted vector");
        Ok(())
    }

    /// Insert many vectors; the graph update is batched.
    pub fn insert_batch<'a, I>(&self, vectors: I) -> Result<usize>
    where
        I: IntoIterator<Item = (&'a str, &'a [f32], Option<VectorMetadata>)>,
    {
        let items: Vec<_> = vectors.into_iter().collect();
        for (id, vector, _) in &items {
            self.validate(id, vector)?;
        }

        let mut state = self.state.write();
        if state.next_internal + items.len() > self.config.max_elements {
            return Err(Error::CapacityExceeded {
                capacity: self.config.max_elements,
            });
        }

        let mut batch: Vec<(Vec<f32>, usize)> = Vec::with_capacity(items.len());
        for (id, vector, metadata) in items {
            let internal_id = self.assign(
                &mut state,
                Entry {
                    id: id.to_string(),
                    vector: vector.to_vec(),
                    metadata,
                },
            )?;
            batch.push((vector.to_vec(), internal_id));
        }

        let refs: Vec<(&Vec<f32>, usize)> = batch.iter().map(|(v, id)| (v, *id)).collect();
        state
            .graph
            .insert_many(&refs, self.config.parallel_construction);

        debug!(count = refs.len(), "Batch inserted vectors");
        Ok(refs.len())
    }

    /// The `limit` closest live vectors to `query`, closest first.
    pub fn search(&self, query: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        if query.len() != self.dimensions {
            return Err(Error::DimensionMismatch {
                expected: self.dimensions,
                actual: query.len(),
            });
        }

        let state = self.state.read();
        if state.entries.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        // Over-fetch so tombstoned points do not starve the result set.
        let k = limit + state.tombstones;
        let ef = self.config.ef_search.max(k);

        let mut results: Vec<SearchResult> = state
            .graph
            .search(query, k, ef)
            .into_iter()
            .filter_map(|(internal_id, distance)| {
                let entry = state.entries.get(&internal_id)?;
                Some(SearchResult {
                    id: entry.id.clone(),
                    score: self.metric.score_from_distance(distance),
                    metadata: entry.metadata.clone(),
                })
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(limit);
        Ok(results)
    }

    /// Search and drop hits below `min_score`.
    pub fn search_with_threshold(
        &self,
        query: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>> {
        let mut results = self.search(query, limit)?;
        results.retain(|r| r.score >= min_score);
        Ok(results)
    }

    /// Stored vector and metadata for `id`.
    pub fn get(&self, id: &str) -> Option<(Vec<f32>, Option<VectorMetadata>)> {
        let state = self.state.read();
        let internal_id = state.ids.get(id)?;
        let entry = state.entries.get(internal_id)?;
        Some((entry.vector.clone(), entry.metadata.clone()))
    }

    /// All live vectors, ordered by insertion.
    pub fn export_all(&self) -> Vec<StoredVector> {
        let state = self.state.read();
        let mut internal_ids: Vec<usize> = state.entries.keys().copied().collect();
        internal_ids.sort_unstable();

        internal_ids
            .into_iter()
            .filter_map(|internal_id| state.entries.get(&internal_id))
            .map(|entry| StoredVector {
                id: entry.id.clone(),
                vector: entry.vector.clone(),
                metadata: entry.metadata.clone(),
            })
            .collect()
    }

    /// Number of replaced points still occupying the graph.
    pub fn tombstones(&self) -> usize {
        self.state.read().tombstones
    }

    /// Rough memory footprint in bytes.
    pub fn memory_usage(&self) -> usize {
        let state = self.state.read();
        let vector_bytes = state.entries.len() * self.dimensions * std::mem::size_of::<f32>();
        let id_bytes: usize = state.ids.keys().map(String::len).sum();
        // graph links: about m neighbours per layer-0 node
        let graph_bytes = state.next_internal * self.config.m * 2 * std::mem::size_of::<usize>();
        vector_bytes + id_bytes + graph_bytes
    }
}
