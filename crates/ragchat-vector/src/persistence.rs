//! On-disk layout of a persistent database.
//!
//! ```text
//! <data_path>/collections.json          names of all collections
//! <data_path>/<name>/metadata.json      dimensions, metric, HNSW parameters
//! <data_path>/<name>/vectors.json       every stored vector
//! ```
//!
//! The HNSW graph itself is not written; it is rebuilt from `vectors.json`
//! when the collection is loaded.

use crate::collection::Collection;
use crate::config::HnswConfig;
use crate::distance::DistanceMetric;
use crate::error::{Error, Result};
use crate::types::StoredVector;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

const COLLECTIONS_FILE: &str = "collections.json";
const METADATA_FILE: &str = "metadata.json";
const VECTORS_FILE: &str = "vectors.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CollectionMetadata {
    name: String,
    dimensions: usize,
    metric: DistanceMetric,
    hnsw_m: usize,
    hnsw_ef_construction: usize,
    hnsw_ef_search: usize,
    vector_count: usize,
}

/// Read `collections.json`. A missing file means no collections.
pub async fn load_collection_names(base_path: &Path) -> Result<Vec<String>> {
    let path = base_path.join(COLLECTIONS_FILE);
    if !path.exists() {
        return Ok(Vec::new());
    }

    let data = tokio::fs::read_to_string(&path).await?;
    serde_json::from_str(&data)
        .map_err(|e| Error::Persistence(format!("Failed to parse {}: {}", COLLECTIONS_FILE, e)))
}

/// Write `collections.json`.
pub async fn save_collection_names(base_path: &Path, names: &[String]) -> Result<()> {
    tokio::fs::create_dir_all(base_path).await?;

    let mut names = names.to_vec();
    names.sort();
    let data = serde_json::to_string_pretty(&names)
        .map_err(|e| Error::Persistence(format!("Failed to serialize collections: {}", e)))?;
    tokio::fs::write(base_path.join(COLLECTIONS_FILE), data).await?;
    Ok(())
}

/// Write a collection's metadata and vectors.
pub async fn save_collection(base_path: &Path, collection: &Collection) -> Result<()> {
    let collection_path = base_path.join(collection.name());
    tokio::fs::create_dir_all(&collection_path).await?;

    let vectors = collection.export_all();
    let hnsw = collection.hnsw_config();
    let metadata = CollectionMetadata {
        name: collection.name().to_string(),
        dimensions: collection.dimensions(),
        metric: collection.metric(),
        hnsw_m: hnsw.m,
        hnsw_ef_construction: hnsw.ef_construction,
        hnsw_ef_search: hnsw.ef_search,
        vector_count: vectors.len(),
    };

    let metadata_json = serde_json::to_string_pretty(&metadata)
        .map_err(|e| Error::Persistence(format!("Failed to serialize metadata: {}", e)))?;
    tokio::fs::write(collection_path.join(METADATA_FILE), metadata_json).await?;

    let vectors_json = serde_json::to_string(&vectors)
        .map_err(|e| Error::Persistence(format!("Failed to serialize vectors: {}", e)))?;
    tokio::fs::write(collection_path.join(VECTORS_FILE), vectors_json).await?;

    info!(name = collection.name(), count = vectors.len(), "Saved collection");
    Ok(())
}

/// Rebuild a collection from its files.
///
/// `defaults` supplies the HNSW fields that are not persisted.
pub async fn load_collection(
    base_path: &Path,
    name: &str,
    defaults: &HnswConfig,
) -> Result<Collection> {
    let collection_path = base_path.join(name);
    if !collection_path.is_dir() {
        return Err(Error::CollectionNotFound(name.to_string()));
    }

    let metadata_json = tokio::fs::read_to_string(collection_path.join(METADATA_FILE)).await?;
    let metadata: CollectionMetadata = serde_json::from_str(&metadata_json)
        .map_err(|e| Error::Persistence(format!("Failed to parse metadata: {}", e)))?;

    let hnsw = HnswConfig {
        m: metadata.hnsw_m,
        ef_construction: metadata.hnsw_ef_construction,
        ef_search: metadata.hnsw_ef_search,
        ..defaults.clone()
    };
    let collection = Collection::new(metadata.name, metadata.dimensions, metadata.metric, hnsw)?;

    let vectors_path = collection_path.join(VECTORS_FILE);
    if vectors_path.exists() {
        let vectors_json = tokio::fs::read_to_string(&vectors_path).await?;
        let vectors: Vec<StoredVector> = serde_json::from_str(&vectors_json)
            .map_err(|e| Error::Persistence(format!("Failed to parse vectors: {}", e)))?;

        let count = collection.insert_batch(
            vectors
                .iter()
                .map(|v| (v.id.as_str(), v.vector.as_slice(), v.metadata.clone())),
        )?;
        debug!(name, count, "Loaded vectors");
    }

    info!(name, dimensions = metadata.dimensions, "Loaded collection");
    Ok(collection)
}

/// Remove a collection's directory.
pub async fn delete_collection_files(base_path: &Path, name: &str) -> Result<()> {
    let collection_path = base_path.join(name);
    if collection_path.exists() {
        tokio::fs::remove_dir_all(&collection_path).await?;
    }
    Ok(())
}
