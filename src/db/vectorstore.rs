//! Vector store abstraction
//!
//! The indexer and retriever only see the [`VectorStore`] trait, so tests
//! can run against an in-memory store and the chat binary against the
//! persistent one.
//!
//! ```rust,ignore
//! let store = RagVectorStore::open(Some("./db/ragchat_index".into())).await?;
//! store.create_collection("documents", 384).await?;
//! store.upsert("documents", &documents).await?;
//! store.persist().await?;
//!
//! let results = store.search("documents", &query_embedding, 3, None).await?;
//! ```

use crate::types::{Document, Result, SearchResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Statistics about a vector collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionStats {
    /// Name of the collection.
    pub name: String,
    /// Number of documents/vectors in the collection.
    pub document_count: usize,
    /// Dimensionality of vectors in the collection.
    pub dimensions: usize,
    /// Size of the index in bytes (if available).
    pub index_size_bytes: Option<u64>,
    /// Distance metric used (e.g., "cosine", "euclidean").
    pub distance_metric: String,
}

/// Abstract trait for vector database operations.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Get the name of this vector store provider.
    fn provider_name(&self) -> &'static str;

    /// Create a new collection with the specified vector dimensions.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection already exists or creation fails.
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()>;

    /// Delete a collection and all its data.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection doesn't exist or deletion fails.
    async fn delete_collection(&self, name: &str) -> Result<()>;

    /// Check if a collection exists.
    async fn collection_exists(&self, name: &str) -> Result<bool>;

    /// Get statistics about a collection.
    async fn collection_stats(&self, name: &str) -> Result<CollectionStats>;

    /// Upsert documents with their embeddings into a collection.
    ///
    /// Documents are identified by their `id` field; an existing document
    /// with the same id is replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if any document is missing an embedding.
    async fn upsert(&self, collection: &str, documents: &[Document]) -> Result<usize>;

    /// Search for similar vectors in a collection.
    ///
    /// # Returns
    ///
    /// At most `limit` results, best first. With a `threshold`, results
    /// scoring below it are dropped.
    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
        threshold: Option<f32>,
    ) -> Result<Vec<SearchResult>>;

    /// Get a document by ID.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    /// Write everything to disk. No-op for in-memory stores.
    async fn persist(&self) -> Result<()>;

    /// Count documents in a collection.
    async fn count(&self, collection: &str) -> Result<usize> {
        let stats = self.collection_stats(collection).await?;
        Ok(stats.document_count)
    }
}
