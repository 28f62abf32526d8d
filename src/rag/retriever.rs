use crate::db::VectorStore;
use crate::rag::embeddings::Embedder;
use crate::types::{Result, SearchResult};
use crate::utils::toml_config::RagConfig;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Nearest-chunk lookup for a query.
pub struct Retriever {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    collection: String,
    top_k: usize,
    min_score: Option<f32>,
}

impl Retriever {
    pub fn new(
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            store,
            embedder,
            collection: collection.into(),
            top_k: 3,
            min_score: None,
        }
    }

    pub fn from_config(
        config: &RagConfig,
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
    ) -> Self {
        let retriever =
            Self::new(store, embedder, config.collection.clone()).with_top_k(config.top_k);
        match config.min_score {
            Some(min_score) => retriever.with_min_score(min_score),
            None => retriever,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Drop chunks scoring below `min_score`. Without it every one of the
    /// `top_k` nearest chunks is returned.
    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = Some(min_score);
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Up to `top_k` chunks most similar to `query`, best first.
    ///
    /// An index built from a folder with no text has no collection; that
    /// retrieves nothing rather than failing.
    #[instrument(skip(self), fields(top_k = self.top_k))]
    pub async fn retrieve(&self, query: &str) -> Result<Vec<SearchResult>> {
        if !self.store.collection_exists(&self.collection).await? {
            debug!(collection = %self.collection, "No collection, nothing to retrieve");
            return Ok(Vec::new());
        }

        let embedding = self.embedder.embed_query(query).await?;
        let results = self
            .store
            .search(&self.collection, &embedding, self.top_k, self.min_score)
            .await?;

        debug!(hits = results.len(), "Retrieved chunks");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::RagVectorStore;
    use crate::types::{Document, DocumentMetadata};
    use async_trait::async_trait;
    use chrono::Utc;

    /// Maps a few keywords onto axes.
    struct KeywordEmbedder;

    #[async_trait]
    impl Embedder for KeywordEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|t| {
                    let t = t.to_lowercase();
                    vec![
                        if t.contains("cat") { 1.0 } else { 0.01 },
                        if t.contains("dog") { 1.0 } else { 0.01 },
                        if t.contains("fish") { 1.0 } else { 0.01 },
                    ]
                })
                .collect())
        }

        fn model_name(&self) -> &str {
            "keywords"
        }
    }

    async fn seeded_store() -> Arc<RagVectorStore> {
        let store = Arc::new(RagVectorStore::in_memory().await.unwrap());
        store.create_collection("documents", 3).await.unwrap();

        let texts = ["cats purr", "dogs bark", "fish swim", "cats and dogs"];
        let embeddings = KeywordEmbedder
            .embed(&texts.iter().map(|t| t.to_string()).collect::<Vec<_>>())
            .await
            .unwrap();

        let docs: Vec<Document> = texts
            .iter()
            .zip(embeddings)
            .enumerate()
            .map(|(i, (text, embedding))| Document {
                id: format!("pets.txt#{}", i),
                content: text.to_string(),
                metadata: DocumentMetadata {
                    title: "pets.txt".to_string(),
                    source: "pets.txt".to_string(),
                    chunk_index: i,
                    created_at: Utc::now(),
                },
                embedding: Some(embedding),
            })
            .collect();
        store.upsert("documents", &docs).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_retrieve_returns_top_k() {
        let retriever = Retriever::new(seeded_store().await, Arc::new(KeywordEmbedder), "documents");

        let results = retriever.retrieve("tell me about fish").await.unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].document.content, "fish swim");

        let one = Retriever::new(seeded_store().await, Arc::new(KeywordEmbedder), "documents")
            .with_top_k(1);
        assert_eq!(one.retrieve("a cat").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_min_score_filters() {
        let retriever = Retriever::new(seeded_store().await, Arc::new(KeywordEmbedder), "documents")
            .with_top_k(4)
            .with_min_score(0.9);

        let results = retriever.retrieve("dog").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document.content, "dogs bark");
    }

    /// Embeds every text to the same vector.
    struct FixedEmbedder(Vec<f32>);

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| self.0.clone()).collect())
        }

        fn model_name(&self) -> &str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn test_dissimilar_chunks_still_fill_top_k() {
        let store = Arc::new(RagVectorStore::in_memory().await.unwrap());
        store.create_collection("documents", 3).await.unwrap();
        let docs: Vec<Document> = (0..4)
            .map(|i| Document {
                id: format!("notes.txt#{}", i),
                content: format!("chunk {}", i),
                metadata: DocumentMetadata {
                    title: "notes.txt".to_string(),
                    source: "notes.txt".to_string(),
                    chunk_index: i,
                    created_at: Utc::now(),
                },
                embedding: Some(vec![1.0, 0.01 * i as f32, 0.0]),
            })
            .collect();
        store.upsert("documents", &docs).await.unwrap();

        // points away from every stored chunk, so every score is negative
        let embedder = Arc::new(FixedEmbedder(vec![-1.0, 0.2, 0.0]));
        let retriever = Retriever::from_config(&RagConfig::default(), store, embedder);

        let results = retriever.retrieve("unrelated").await.unwrap();
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.score < 0.0));
    }

    #[tokio::test]
    async fn test_missing_collection_is_empty() {
        let store = Arc::new(RagVectorStore::in_memory().await.unwrap());
        let retriever = Retriever::new(store, Arc::new(KeywordEmbedder), "documents");
        assert!(retriever.retrieve("anything").await.unwrap().is_empty());
    }
}
