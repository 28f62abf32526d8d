//! # ragchat
//!
//! Conversational question answering over a folder of documents.
//!
//! ragchat loads PDF, Word and plain-text files, splits them into chunks,
//! embeds the chunks into a persisted HNSW index and answers questions in a
//! console chat. Follow-up questions are rewritten into standalone queries
//! from the conversation, the closest chunks are retrieved, and a local
//! Ollama model answers from them.
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use ragchat::{
//!     db::RagVectorStore,
//!     rag::{chain::RagChain, embeddings::EmbeddingProvider, indexer::Indexer, retriever::Retriever},
//!     memory::ChatHistory,
//!     Provider, RagChatConfig,
//! };
//! use std::sync::Arc;
//!
//! let config = RagChatConfig::default();
//! let embedder = EmbeddingProvider::from_config(&config).create_embedder().await?;
//! let store = Arc::new(RagVectorStore::open(Some(config.index.dir.clone())).await?);
//!
//! Indexer::from_config(&config.rag, store.clone(), embedder.clone())?
//!     .build("./documents".as_ref())
//!     .await?;
//!
//! let llm = Provider::from_config(&config.llm).create_client().await?;
//! let chain = RagChain::new(llm.into(), Retriever::from_config(&config.rag, store, embedder));
//!
//! let answer = chain.invoke("What are these documents about?", &ChatHistory::new()).await?;
//! println!("{}", answer.answer);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `ollama` | Ollama chat model and embeddings (default) |
//! | `local-embeddings` | Local ONNX embeddings via fastembed (default) |
//!
//! ## Modules
//!
//! - [`chat`] - Console chat loop and index selection
//! - [`cli`] - Command-line parsing and colored output
//! - [`db`] - Vector store over the embedded `ragchat-vector` index
//! - [`llm`] - LLM client implementations
//! - [`memory`] - Chat history
//! - [`rag`] - Loading, chunking, embedding, retrieval and the answer chain
//! - [`types`] - Common types and error handling
//! - [`utils`] - Configuration and logging

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// Console chat loop and index selection.
pub mod chat;
/// Command-line interface.
pub mod cli;
/// Vector store abstraction and the embedded implementation.
pub mod db;
/// LLM provider clients and abstractions.
pub mod llm;
/// Conversation memory.
pub mod memory;
/// Retrieval Augmented Generation (RAG) components.
pub mod rag;
/// Core types and errors.
pub mod types;
/// Configuration and logging.
pub mod utils;

// Re-export commonly used types
pub use chat::ChatSession;
pub use llm::{LLMClient, Provider};
pub use types::{AppError, Result};
pub use utils::toml_config::{ConfigError, RagChatConfig};
