//! # ragchat-vector
//!
//! Embedded vector store backing the ragchat document index. Vectors live in
//! an HNSW graph per collection, and a persistent database writes every
//! collection under one directory so a later run can reopen it.
//!
//! ```rust,ignore
//! use ragchat_vector::{Config, DistanceMetric, VectorDb};
//!
//! let db = VectorDb::open(Config::persistent("./db/ragchat_index")).await?;
//! db.create_collection("documents", 384, DistanceMetric::Cosine).await?;
//! db.insert("documents", "chunk-0", &embedding, None).await?;
//! db.persist().await?;
//!
//! let hits = db.search("documents", &query, 3).await?;
//! ```
//!
//! ```text
//! VectorDb
//!  └── Collection (name, dimensions, metric)
//!       └── HnswIndex (graph + id map + metadata)
//!
//! <data_path>/collections.json
//! <data_path>/<name>/{metadata.json, vectors.json}
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod collection;
pub mod config;
pub mod distance;
pub mod error;
pub mod index;
pub mod persistence;
pub mod types;

pub use collection::Collection;
pub use config::{Config, HnswConfig};
pub use distance::DistanceMetric;
pub use error::{Error, Result};
pub use types::{SearchResult, StoredVector, VectorId, VectorMetadata};

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// A set of named collections, optionally backed by a directory.
///
/// Cloning is cheap and every clone sees the same collections. The map is an
/// `scc::HashMap`, so lookups never hold a lock across `.await`.
#[derive(Clone)]
pub struct VectorDb {
    inner: Arc<VectorDbInner>,
}

struct VectorDbInner {
    config: Config,
    collections: scc::HashMap<String, Arc<Collection>>,
}

impl VectorDb {
    /// Open a database. A persistent database reloads every collection listed
    /// in its `collections.json` and fails if any of them cannot be read.
    #[instrument(skip(config), fields(persistent = config.data_path.is_some()))]
    pub async fn open(config: Config) -> Result<Self> {
        info!("Opening vector database");

        let db = Self {
            inner: Arc::new(VectorDbInner {
                config: config.clone(),
                collections: scc::HashMap::new(),
            }),
        };

        if let Some(ref path) = config.data_path {
            db.load_collections(path).await?;
        }

        Ok(db)
    }

    /// The configuration this database was opened with.
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Create an empty collection.
    ///
    /// # Errors
    ///
    /// [`Error::CollectionExists`] if the name is taken.
    #[instrument(skip(self))]
    pub async fn create_collection(
        &self,
        name: &str,
        dimensions: usize,
        metric: DistanceMetric,
    ) -> Result<()> {
        info!(name, dimensions, %metric, "Creating collection");

        if self.inner.collections.contains(name) {
            return Err(Error::CollectionExists(name.to_string()));
        }

        let collection = Collection::new(
            name.to_string(),
            dimensions,
            metric,
            self.inner.config.hnsw.clone(),
        )?;

        if self
            .inner
            .collections
            .insert(name.to_string(), Arc::new(collection))
            .is_err()
        {
            return Err(Error::CollectionExists(name.to_string()));
        }

        if let Some(ref path) = self.inner.config.data_path {
            persistence::save_collection_names(path, &self.list_collections()).await?;
        }

        Ok(())
    }

    /// Drop a collection and, for a persistent database, its files.
    #[instrument(skip(self))]
    pub async fn delete_collection(&self, name: &str) -> Result<()> {
        info!(name, "Deleting collection");

        if self.inner.collections.remove(name).is_none() {
            return Err(Error::CollectionNotFound(name.to_string()));
        }

        if let Some(ref path) = self.inner.config.data_path {
            persistence::delete_collection_files(path, name).await?;
            persistence::save_collection_names(path, &self.list_collections()).await?;
        }

        Ok(())
    }

    /// True if a collection with this name is open.
    pub fn collection_exists(&self, name: &str) -> bool {
        self.inner.collections.contains(name)
    }

    /// Names of all open collections, sorted.
    pub fn list_collections(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.inner.collections.scan(|k, _| {
            names.push(k.clone());
        });
        names.sort();
        names
    }

    /// Shared handle to a collection.
    pub fn get_collection(&self, name: &str) -> Result<Arc<Collection>> {
        self.inner
            .collections
            .read(name, |_, v| v.clone())
            .ok_or_else(|| Error::CollectionNotFound(name.to_string()))
    }

    /// Insert or replace one vector.
    #[instrument(skip(self, vector, metadata), fields(dim = vector.len()))]
    pub async fn insert(
        &self,
        collection: &str,
        id: &str,
        vector: &[f32],
        metadata: Option<VectorMetadata>,
    ) -> Result<()> {
        let col = self.get_collection(collection)?;
        col.insert(id, vector, metadata)?;
        debug!("Inserted vector");
        Ok(())
    }

    /// Insert or replace many vectors in one graph update.
    ///
    /// Returns the number inserted. Nothing is inserted if any vector is
    /// rejected.
    #[instrument(skip(self, vectors))]
    pub async fn insert_batch<'a, I>(&self, collection: &str, vectors: I) -> Result<usize>
    where
        I: IntoIterator<Item = (&'a str, &'a [f32], Option<VectorMetadata>)>,
    {
        let col = self.get_collection(collection)?;
        let count = col.insert_batch(vectors)?;
        debug!(count, "Inserted batch");
        Ok(count)
    }

    /// Up to `limit` closest vectors, best first.
    #[instrument(skip(self, query), fields(dim = query.len()))]
    pub async fn search(
        &self,
        collection: &str,
        query: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        let col = self.get_collection(collection)?;
        let results = col.search(query, limit)?;
        debug!(count = results.len(), "Search completed");
        Ok(results)
    }

    /// Like [`search`](Self::search), dropping hits scoring below `min_score`.
    #[instrument(skip(self, query))]
    pub async fn search_with_threshold(
        &self,
        collection: &str,
        query: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>> {
        let col = self.get_collection(collection)?;
        col.search_with_threshold(query, limit, min_score)
    }

    /// Stored vector and metadata by id.
    pub async fn get(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<(Vec<f32>, Option<VectorMetadata>)>> {
        let col = self.get_collection(collection)?;
        Ok(col.get(id))
    }

    /// Number of vectors in a collection.
    pub fn count(&self, collection: &str) -> Result<usize> {
        let col = self.get_collection(collection)?;
        Ok(col.len())
    }

    /// Summary numbers for a collection.
    pub fn collection_stats(&self, collection: &str) -> Result<CollectionStats> {
        let col = self.get_collection(collection)?;
        Ok(col.stats())
    }

    /// Write every collection to disk. No-op for an in-memory database.
    #[instrument(skip(self))]
    pub async fn persist(&self) -> Result<()> {
        let Some(ref path) = self.inner.config.data_path else {
            debug!("Skipping persist for in-memory database");
            return Ok(());
        };

        info!("Persisting database to disk");

        let mut to_persist: Vec<Arc<Collection>> = Vec::new();
        self.inner.collections.scan(|_, collection| {
            to_persist.push(collection.clone());
        });

        for collection in &to_persist {
            persistence::save_collection(path, collection).await?;
        }
        persistence::save_collection_names(path, &self.list_collections()).await?;

        Ok(())
    }

    async fn load_collections(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            tokio::fs::create_dir_all(path).await?;
            return Ok(());
        }

        for name in persistence::load_collection_names(path).await? {
            let collection = persistence::load_collection(path, &name, &self.inner.config.hnsw)
                .await
                .map_err(|e| {
                    Error::Persistence(format!("Failed to load collection '{}': {}", name, e))
                })?;
            let _ = self.inner.collections.insert(name, Arc::new(collection));
        }

        Ok(())
    }
}

/// Statistics about a collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionStats {
    /// Name of the collection.
    pub name: String,
    /// Number of live vectors.
    pub vector_count: usize,
    /// Dimensionality of vectors.
    pub dimensions: usize,
    /// Distance metric used.
    pub metric: DistanceMetric,
    /// Approximate memory usage in bytes.
    pub memory_bytes: usize,
    /// HNSW index parameters.
    pub hnsw_params: HnswParams,
}

/// HNSW parameters reported in [`CollectionStats`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HnswParams {
    /// Maximum number of connections per layer.
    pub m: usize,
    /// Candidate list size during construction.
    pub ef_construction: usize,
    /// Candidate list size during search.
    pub ef_search: usize,
}
