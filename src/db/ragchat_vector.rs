//! Vector store backed by the embedded `ragchat-vector` HNSW database.
//!
//! Vectors and their metadata live in the `ragchat-vector` files; the full
//! chunk documents are kept beside them in `documents.json` so search hits
//! can be returned with their text.

use crate::types::{AppError, Document, Result, SearchResult};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::vectorstore::{CollectionStats, VectorStore};
use ragchat_vector::{Config, DistanceMetric, VectorDb, VectorMetadata};

const DOCUMENTS_FILE: &str = "documents.json";

type DocumentMap = HashMap<String, HashMap<String, Document>>;

/// HNSW vector store, in memory or persisted under a directory.
pub struct RagVectorStore {
    db: VectorDb,
    path: Option<PathBuf>,
    /// collection -> id -> document (without embedding)
    documents: Arc<RwLock<DocumentMap>>,
}

impl RagVectorStore {
    /// Open a store. With a path, collections and documents persisted there
    /// by an earlier run are loaded.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized or loaded.
    #[instrument(skip_all, fields(path = ?path))]
    pub async fn open(path: Option<PathBuf>) -> Result<Self> {
        let config = match path {
            Some(ref p) => Config::persistent(p.clone()),
            None => Config::memory(),
        };

        let db = VectorDb::open(config).await.map_err(|e| {
            AppError::VectorStore(format!("Failed to open vector index: {}", e))
        })?;

        let store = Self {
            db,
            path,
            documents: Arc::new(RwLock::new(HashMap::new())),
        };

        if let Some(ref path) = store.path {
            store.load_documents(path).await?;
        }

        Ok(store)
    }

    /// In-memory store.
    pub async fn in_memory() -> Result<Self> {
        Self::open(None).await
    }

    /// Directory the store persists to, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    async fn load_documents(&self, path: &Path) -> Result<()> {
        let docs_path = path.join(DOCUMENTS_FILE);
        if !docs_path.exists() {
            return Ok(());
        }

        let data = tokio::fs::read_to_string(&docs_path).await?;
        let loaded: DocumentMap = serde_json::from_str(&data).map_err(|e| {
            AppError::VectorStore(format!("Failed to parse {}: {}", DOCUMENTS_FILE, e))
        })?;

        let count: usize = loaded.values().map(HashMap::len).sum();
        *self.documents.write() = loaded;
        info!(count, "Loaded stored documents");
        Ok(())
    }

    async fn save_documents(&self) -> Result<()> {
        let Some(ref path) = self.path else {
            return Ok(());
        };

        // serialize before the await so the lock is not held across it
        let data = {
            let docs = self.documents.read();
            serde_json::to_string(&*docs).map_err(|e| {
                AppError::Internal(format!("Failed to serialize documents: {}", e))
            })?
        };

        tokio::fs::create_dir_all(path).await?;
        tokio::fs::write(path.join(DOCUMENTS_FILE), data).await?;
        Ok(())
    }
}

fn vector_metadata(doc: &Document) -> VectorMetadata {
    VectorMetadata::from_pairs([
        ("title", doc.metadata.title.clone()),
        ("source", doc.metadata.source.clone()),
        ("chunk_index", doc.metadata.chunk_index.to_string()),
    ])
}

#[async_trait]
impl VectorStore for RagVectorStore {
    fn provider_name(&self) -> &'static str {
        "ragchat-vector"
    }

    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        self.db
            .create_collection(name, dimensions, DistanceMetric::Cosine)
            .await?;

        self.documents
            .write()
            .insert(name.to_string(), HashMap::new());

        self.save_documents().await
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        self.db.delete_collection(name).await?;
        self.documents.write().remove(name);
        self.save_documents().await
    }

    async fn collection_exists(&self, name: &str) -> Result<bool> {
        Ok(self.db.collection_exists(name))
    }

    async fn collection_stats(&self, name: &str) -> Result<CollectionStats> {
        let stats = self.db.collection_stats(name)?;

        Ok(CollectionStats {
            name: stats.name,
            document_count: stats.vector_count,
            dimensions: stats.dimensions,
            index_size_bytes: Some(stats.memory_bytes as u64),
            distance_metric: stats.metric.to_string(),
        })
    }

    #[instrument(skip(self, documents), fields(count = documents.len()))]
    async fn upsert(&self, collection: &str, documents: &[Document]) -> Result<usize> {
        if documents.is_empty() {
            return Ok(0);
        }

        let mut items: Vec<(&str, &[f32], Option<VectorMetadata>)> =
            Vec::with_capacity(documents.len());
        for doc in documents {
            let embedding = doc.embedding.as_deref().ok_or_else(|| {
                AppError::InvalidInput(format!("Document '{}' missing embedding", doc.id))
            })?;
            items.push((doc.id.as_str(), embedding, Some(vector_metadata(doc))));
        }

        let inserted = self.db.insert_batch(collection, items).await?;

        {
            let mut docs = self.documents.write();
            let collection_docs = docs.entry(collection.to_string()).or_default();
            for doc in documents {
                let mut stored = doc.clone();
                stored.embedding = None;
                collection_docs.insert(doc.id.clone(), stored);
            }
        }

        debug!(inserted, "Upserted documents");
        Ok(inserted)
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
        threshold: Option<f32>,
    ) -> Result<Vec<SearchResult>> {
        let hits = match threshold {
            Some(min_score) => {
                self.db
                    .search_with_threshold(collection, embedding, limit, min_score)
                    .await?
            }
            None => self.db.search(collection, embedding, limit).await?,
        };

        let docs = self.documents.read();
        let collection_docs = docs.get(collection);

        let results = hits
            .into_iter()
            .filter_map(|hit| {
                let document = collection_docs?.get(&hit.id)?.clone();
                Some(SearchResult {
                    document,
                    score: hit.score,
                })
            })
            .collect();

        Ok(results)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        if !self.db.collection_exists(collection) {
            return Err(AppError::NotFound(format!(
                "Collection '{}' not found",
                collection
            )));
        }

        Ok(self
            .documents
            .read()
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn persist(&self) -> Result<()> {
        self.db.persist().await?;
        self.save_documents().await
    }
}
