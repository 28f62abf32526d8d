//! Vector storage for document chunks.
//!
//! - [`VectorStore`] - the trait the RAG pipeline uses
//! - [`RagVectorStore`] - embedded HNSW store from the `ragchat-vector` crate
//! - [`index_exists`] - whether a persisted index is available to reuse

pub mod ragchat_vector;
pub mod vectorstore;

pub use ragchat_vector::RagVectorStore;
pub use vectorstore::{CollectionStats, VectorStore};

use std::path::Path;

/// True when `dir` exists and holds at least one entry.
///
/// An empty or missing directory means there is nothing to reuse.
pub fn index_exists(dir: &Path) -> bool {
    std::fs::read_dir(dir)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}
