//! Named collections.

use crate::config::HnswConfig;
use crate::distance::DistanceMetric;
use crate::error::Result;
use crate::index::HnswIndex;
use crate::types::{SearchResult, StoredVector, VectorMetadata};
use crate::{CollectionStats, HnswParams};

/// A named set of vectors sharing one dimensionality and metric.
pub struct Collection {
    name: String,
    index: HnswIndex,
    hnsw_config: HnswConfig,
}

impl Collection {
    /// Create an empty collection.
    pub fn new(
        name: String,
        dimensions: usize,
        metric: DistanceMetric,
        hnsw_config: HnswConfig,
    ) -> Result<Self> {
        let index = HnswIndex::new(dimensions, metric, hnsw_config.clone())?;
        Ok(Self {
            name,
            index,
            hnsw_config,
        })
    }

    /// Collection name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Vector dimensions.
    pub fn dimensions(&self) -> usize {
        self.index.dimensions()
    }

    /// Distance metric.
    pub fn metric(&self) -> DistanceMetric {
        self.index.metric()
    }

    /// HNSW parameters the collection was built with.
    pub fn hnsw_config(&self) -> &HnswConfig {
        &self.hnsw_config
    }

    /// Number of vectors.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True when the collection holds no vectors.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Insert or replace one vector.
    pub fn insert(&self, id: &str, vector: &[f32], metadata: Option<VectorMetadata>) -> Result<()> {
        self.index.insert(id, vector, metadata)
    }

    /// Insert or replace many vectors.
    pub fn insert_batch<'a, I>(&self, vectors: I) -> Result<usize>
    where
        I: IntoIterator<Item = (&'a str, &'a [f32], Option<VectorMetadata>)>,
    {
        self.index.insert_batch(vectors)
    }

    /// Closest vectors to `query`.
    pub fn search(&self, query: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        self.index.search(query, limit)
    }

    /// Closest vectors to `query` scoring at least `min_score`.
    pub fn search_with_threshold(
        &self,
        query: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>> {
        self.index.search_with_threshold(query, limit, min_score)
    }

    /// Stored vector and metadata.
    pub fn get(&self, id: &str) -> Option<(Vec<f32>, Option<VectorMetadata>)> {
        self.index.get(id)
    }

    /// True if `id` is stored.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains(id)
    }

    /// Every stored vector, for persistence.
    pub fn export_all(&self) -> Vec<StoredVector> {
        self.index.export_all()
    }

    /// Summary numbers.
    pub fn stats(&self) -> CollectionStats {
        CollectionStats {
            name: self.name.clone(),
            vector_count: self.index.len(),
            dimensions: self.index.dimensions(),
            metric: self.index.metric(),
            memory_bytes: self.index.memory_usage(),
            hnsw_params: HnswParams {
                m: self.hnsw_config.m,
                ef_construction: self.hnsw_config.ef_construction,
                ef_search: self.hnsw_config.ef_search,
            },
        }
    }
}
