//! Dense embeddings for chunks and queries.
//!
//! Two backends sit behind the [`Embedder`] trait:
//! - [`FastEmbedder`] runs a local ONNX model through fastembed
//!   (`all-MiniLM-L6-v2` by default)
//! - [`OllamaEmbedder`] calls `/api/embed` on an Ollama server

use crate::types::{AppError, Result};
use crate::utils::toml_config::{EmbeddingBackend, RagChatConfig};
use async_trait::async_trait;
use std::sync::Arc;

/// Default local embedding model.
pub const DEFAULT_EMBEDDING_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Turns text into vectors.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// One vector per input, in input order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single query.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Embedding("Embedder returned no vector".to_string()))
    }

    fn model_name(&self) -> &str;
}

/// Embedding backend selection.
#[derive(Debug, Clone, PartialEq)]
pub enum EmbeddingProvider {
    FastEmbed { model: String },
    Ollama { base_url: String, model: String },
}

impl EmbeddingProvider {
    pub fn from_config(config: &RagChatConfig) -> Self {
        match config.embeddings.backend {
            EmbeddingBackend::FastEmbed => EmbeddingProvider::FastEmbed {
                model: config.embeddings.model.clone(),
            },
            EmbeddingBackend::Ollama => EmbeddingProvider::Ollama {
                base_url: config.llm.base_url.clone(),
                model: config.embeddings.model.clone(),
            },
        }
    }

    /// Build the embedder. Loading a local model may download it first.
    pub async fn create_embedder(&self) -> Result<Arc<dyn Embedder>> {
        match self {
            #[cfg(feature = "local-embeddings")]
            EmbeddingProvider::FastEmbed { model } => {
                let model = model.clone();
                let embedder = tokio::task::spawn_blocking(move || FastEmbedder::new(&model))
                    .await
                    .map_err(|e| AppError::Internal(format!("Embedding model task failed: {}", e)))??;
                Ok(Arc::new(embedder))
            }

            #[cfg(feature = "ollama")]
            EmbeddingProvider::Ollama { base_url, model } => Ok(Arc::new(OllamaEmbedder::new(
                base_url,
                model.clone(),
            )?)),

            #[allow(unreachable_patterns)]
            _ => Err(AppError::Configuration(
                "Embedding backend not enabled. Check feature flags.".into(),
            )),
        }
    }
}

// ============================================================================
// fastembed
// ============================================================================

#[cfg(feature = "local-embeddings")]
pub use local::FastEmbedder;

#[cfg(feature = "local-embeddings")]
mod local {
    use super::Embedder;
    use crate::types::{AppError, Result};
    use async_trait::async_trait;
    use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
    use parking_lot::Mutex;
    use std::sync::Arc;
    use tracing::{debug, info};

    /// Local ONNX embedding model.
    pub struct FastEmbedder {
        model: Arc<Mutex<TextEmbedding>>,
        name: String,
    }

    /// fastembed model for a configured name.
    pub fn resolve_model(name: &str) -> Result<EmbeddingModel> {
        match name {
            "sentence-transformers/all-MiniLM-L6-v2" | "all-MiniLM-L6-v2" => {
                Ok(EmbeddingModel::AllMiniLML6V2)
            }
            "BAAI/bge-small-en-v1.5" | "bge-small-en-v1.5" => Ok(EmbeddingModel::BGESmallENV15),
            "BAAI/bge-base-en-v1.5" | "bge-base-en-v1.5" => Ok(EmbeddingModel::BGEBaseENV15),
            other => Err(AppError::Configuration(format!(
                "Unsupported local embedding model '{}'",
                other
            ))),
        }
    }

    impl FastEmbedder {
        pub fn new(model_name: &str) -> Result<Self> {
            let model_kind = resolve_model(model_name)?;
            info!(model = model_name, "Loading embedding model");

            let model = TextEmbedding::try_new(
                InitOptions::new(model_kind).with_show_download_progress(true),
            )
            .map_err(|e| AppError::Embedding(e.to_string()))?;

            Ok(Self {
                model: Arc::new(Mutex::new(model)),
                name: model_name.to_string(),
            })
        }
    }

    #[async_trait]
    impl Embedder for FastEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            if texts.is_empty() {
                return Ok(Vec::new());
            }

            let model = Arc::clone(&self.model);
            let texts = texts.to_vec();
            debug!(count = texts.len(), "Embedding locally");

            tokio::task::spawn_blocking(move || model.lock().embed(texts, None))
                .await
                .map_err(|e| AppError::Internal(format!("Embedding task failed: {}", e)))?
                .map_err(|e| AppError::Embedding(e.to_string()))
        }

        fn model_name(&self) -> &str {
            &self.name
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_resolve_model() {
            assert!(matches!(
                resolve_model("sentence-transformers/all-MiniLM-L6-v2"),
                Ok(EmbeddingModel::AllMiniLML6V2)
            ));
            assert!(matches!(
                resolve_model("BAAI/bge-small-en-v1.5"),
                Ok(EmbeddingModel::BGESmallENV15)
            ));
            assert!(resolve_model("made-up/model").is_err());
        }
    }
}

// ============================================================================
// Ollama
// ============================================================================

#[cfg(feature = "ollama")]
pub use remote::OllamaEmbedder;

#[cfg(feature = "ollama")]
mod remote {
    use super::Embedder;
    use crate::llm::client::split_base_url;
    use crate::types::{AppError, Result};
    use async_trait::async_trait;
    use ollama_rs::generation::embeddings::request::{EmbeddingsInput, GenerateEmbeddingsRequest};
    use ollama_rs::Ollama;
    use tracing::debug;

    /// Embeddings computed by an Ollama server.
    pub struct OllamaEmbedder {
        client: Ollama,
        model: String,
    }

    impl OllamaEmbedder {
        pub fn new(base_url: &str, model: String) -> Result<Self> {
            let (host, port) = split_base_url(base_url)?;
            Ok(Self {
                client: Ollama::new(host, port),
                model,
            })
        }
    }

    #[async_trait]
    impl Embedder for OllamaEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            if texts.is_empty() {
                return Ok(Vec::new());
            }

            debug!(count = texts.len(), model = %self.model, "Embedding via Ollama");
            let request = GenerateEmbeddingsRequest::new(
                self.model.clone(),
                EmbeddingsInput::Multiple(texts.to_vec()),
            );

            let response = self
                .client
                .generate_embeddings(request)
                .await
                .map_err(|e| AppError::Embedding(format!("Ollama error: {}", e)))?;

            if response.embeddings.len() != texts.len() {
                return Err(AppError::Embedding(format!(
                    "Ollama returned {} embeddings for {} inputs",
                    response.embeddings.len(),
                    texts.len()
                )));
            }

            Ok(response.embeddings)
        }

        fn model_name(&self) -> &str {
            &self.model
        }
    }
}
