//! Index building and reuse.
//!
//! A build always starts from scratch: the collection is dropped, every file
//! in the folder is loaded and chunked, chunks are embedded batch by batch
//! and the result is persisted to the index directory.

use crate::db::{RagVectorStore, VectorStore};
use crate::rag::chunker::TextChunker;
use crate::rag::embeddings::Embedder;
use crate::rag::loader::{load_folder, LoadedDocument};
use crate::types::{AppError, Document, DocumentMetadata, Result};
use crate::utils::toml_config::RagConfig;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Outcome of [`Indexer::build`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndexReport {
    /// Files loaded from the folder.
    pub files: usize,
    /// Chunks embedded and stored.
    pub chunks: usize,
}

pub struct Indexer {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    chunker: TextChunker,
    collection: String,
    batch_size: usize,
}

impl Indexer {
    pub fn new(
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        chunker: TextChunker,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            store,
            embedder,
            chunker,
            collection: collection.into(),
            batch_size: 64,
        }
    }

    /// Indexer using the chunking, batching and collection settings of `[rag]`.
    pub fn from_config(
        config: &RagConfig,
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self> {
        let chunker = TextChunker::new(config.chunk_size, config.chunk_overlap)?;
        Ok(Self::new(store, embedder, chunker, config.collection.clone())
            .with_batch_size(config.embed_batch_size))
    }

    /// Chunks per embedding request. Zero is treated as one.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Open the index persisted at `dir` as is. Nothing is loaded from any
    /// document folder and nothing is re-embedded.
    pub async fn open_existing(dir: &Path) -> Result<RagVectorStore> {
        info!(dir = %dir.display(), "Loading existing index");
        RagVectorStore::open(Some(dir.to_path_buf())).await
    }

    /// Rebuild the collection from every file directly inside `folder`.
    ///
    /// # Errors
    ///
    /// Any file that cannot be read or parsed, and any embedding or storage
    /// failure, aborts the build.
    #[instrument(skip(self), fields(collection = %self.collection))]
    pub async fn build(&self, folder: &Path) -> Result<IndexReport> {
        let start = Instant::now();

        if self.store.collection_exists(&self.collection).await? {
            debug!("Dropping existing collection");
            self.store.delete_collection(&self.collection).await?;
        }

        let folder: PathBuf = folder.to_path_buf();
        let loaded = tokio::task::spawn_blocking(move || load_folder(&folder))
            .await
            .map_err(|e| AppError::Internal(format!("Document loading task failed: {}", e)))??;

        let mut documents = self.chunk_documents(&loaded);
        let mut report = IndexReport {
            files: loaded.len(),
            chunks: 0,
        };

        if documents.is_empty() {
            warn!(files = report.files, "No text found to index");
            self.store.persist().await?;
            return Ok(report);
        }

        for batch in documents.chunks_mut(self.batch_size) {
            let texts: Vec<String> = batch.iter().map(|d| d.content.clone()).collect();
            let embeddings = self.embedder.embed(&texts).await?;

            if embeddings.len() != batch.len() {
                return Err(AppError::Embedding(format!(
                    "Expected {} embeddings, got {}",
                    batch.len(),
                    embeddings.len()
                )));
            }

            if report.chunks == 0 {
                let dimensions = embeddings.first().map(Vec::len).unwrap_or(0);
                self.store
                    .create_collection(&self.collection, dimensions)
                    .await?;
            }

            for (doc, embedding) in batch.iter_mut().zip(embeddings) {
                doc.embedding = Some(embedding);
            }

            report.chunks += self.store.upsert(&self.collection, batch).await?;
            debug!(stored = report.chunks, "Stored batch");
        }

        self.store.persist().await?;

        info!(
            files = report.files,
            chunks = report.chunks,
            duration_ms = start.elapsed().as_millis() as u64,
            "Index built"
        );

        Ok(report)
    }

    fn chunk_documents(&self, loaded: &[LoadedDocument]) -> Vec<Document> {
        let created_at = Utc::now();
        let mut documents = Vec::new();

        for file in loaded {
            let chunks = self.chunker.chunk(&file.text);
            debug!(file = %file.title, chunks = chunks.len(), "Chunked file");

            for (i, content) in chunks.into_iter().enumerate() {
                documents.push(Document {
                    id: format!("{}#{}", file.title, i),
                    content,
                    metadata: DocumentMetadata {
                        title: file.title.clone(),
                        source: file.source.display().to_string(),
                        chunk_index: i,
                        created_at,
                    },
                    embedding: None,
                });
            }
        }

        documents
    }
}
