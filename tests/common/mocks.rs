//! Mock implementations for testing.
//!
//! Shared across the integration tests so no test needs a running Ollama
//! server or a downloaded embedding model.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use ragchat::llm::LLMClient;
use ragchat::rag::embeddings::Embedder;
use ragchat::types::{AppError, Result};
use std::collections::hash_map::DefaultHasher;
use std::collections::VecDeque;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Mock LLM client with scripted replies that records every conversation
/// it is sent.
///
/// Replies are taken from the script in order; once it runs out the
/// fallback reply is returned.
#[derive(Clone)]
pub struct MockLLMClient {
    script: Arc<Mutex<VecDeque<String>>>,
    fallback: String,
    calls: Arc<Mutex<Vec<Vec<(String, String)>>>>,
    should_fail: bool,
}

impl MockLLMClient {
    /// Always reply with `response`.
    pub fn new(response: &str) -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            fallback: response.to_string(),
            calls: Arc::new(Mutex::new(Vec::new())),
            should_fail: false,
        }
    }

    /// Reply with `responses` in order, then with `fallback`.
    pub fn scripted(responses: &[&str], fallback: &str) -> Self {
        let client = Self::new(fallback);
        client
            .script
            .lock()
            .extend(responses.iter().map(|r| r.to_string()));
        client
    }

    /// Always fail.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::new("")
        }
    }

    /// Every conversation sent so far, as `(role, content)` pairs.
    pub fn calls(&self) -> Vec<Vec<(String, String)>> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    fn reply(&self, messages: Vec<(String, String)>) -> Result<String> {
        self.calls.lock().push(messages);
        if self.should_fail {
            return Err(AppError::LLM("Mock LLM failure".to_string()));
        }
        Ok(self
            .script
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone()))
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.reply(vec![("user".to_string(), prompt.to_string())])
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.reply(vec![
            ("system".to_string(), system.to_string()),
            ("user".to_string(), prompt.to_string()),
        ])
    }

    async fn generate_with_history(&self, messages: &[(String, String)]) -> Result<String> {
        self.reply(messages.to_vec())
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// Bag-of-words embedder: each lowercase word is hashed into one of
/// `DIMENSIONS` buckets. Texts sharing words land close together.
#[derive(Clone, Default)]
pub struct MockEmbedder {
    calls: Arc<AtomicUsize>,
    texts: Arc<AtomicUsize>,
}

impl MockEmbedder {
    pub const DIMENSIONS: usize = 64;

    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `embed` calls made.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of texts embedded across all calls.
    pub fn text_count(&self) -> usize {
        self.texts.load(Ordering::SeqCst)
    }

    pub fn vector(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; Self::DIMENSIONS];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            vector[(hasher.finish() % Self::DIMENSIONS as u64) as usize] += 1.0;
        }
        // keep empty text off the zero vector
        vector[0] += 0.01;
        vector
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.texts.fetch_add(texts.len(), Ordering::SeqCst);
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }

    fn model_name(&self) -> &str {
        "mock-embedder"
    }
}
