//! LLM provider clients and abstractions
//!
//! - [`LLMClient`] - The trait the RAG chain talks to
//! - [`Provider`] - Runtime provider selection, built from the `[llm]` config
//!
//! Enable providers via Cargo features:
//! - `ollama` - Local Ollama server (default)

/// Core LLM client trait and provider selection.
pub mod client;

#[cfg(feature = "ollama")]
pub mod ollama;

pub use client::{LLMClient, Provider};
