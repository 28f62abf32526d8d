//! Retrieval Augmented Generation (RAG) pipeline
//!
//! # Module Structure
//!
//! - [`rag::loader`](crate::rag::loader) - PDF, Word and plain-text loading
//! - [`rag::chunker`](crate::rag::chunker) - Text chunking for document processing
//! - [`rag::embeddings`](crate::rag::embeddings) - Dense embeddings (fastembed or Ollama)
//! - [`rag::indexer`](crate::rag::indexer) - Build or reopen the persisted index
//! - [`rag::retriever`](crate::rag::retriever) - Top-k similarity lookup
//! - [`rag::prompts`](crate::rag::prompts) - Contextualize and QA prompts
//! - [`rag::chain`](crate::rag::chain) - History-aware retrieval chain
//!
//! # Pipeline
//!
//! 1. **Ingestion** - Files are loaded, chunked and embedded
//! 2. **Storage** - Embeddings stored in the vector index on disk
//! 3. **Contextualization** - Follow-up questions rewritten to stand alone
//! 4. **Retrieval** - Query embedded, similar chunks retrieved
//! 5. **Generation** - LLM answers from the retrieved chunks
//!
//! # Example
//!
//! ```ignore
//! use ragchat::rag::{chain::RagChain, retriever::Retriever};
//!
//! let retriever = Retriever::new(store, embedder, "documents");
//! let chain = RagChain::new(llm, retriever);
//!
//! let answer = chain.invoke("What is in the report?", &history).await?;
//! println!("{}", answer.answer);
//! ```

pub mod chain;
pub mod chunker;
pub mod embeddings;
pub mod indexer;
pub mod loader;
pub mod prompts;
pub mod retriever;
