//! History-aware retrieval chain.
//!
//! One [`RagChain::invoke`] answers one user turn in two model calls at
//! most:
//!
//! 1. With prior turns, the model rewrites the input into a standalone
//!    question using [`CONTEXTUALIZE_SYSTEM_PROMPT`]. Without history the
//!    input is used as is and this call is skipped.
//! 2. The standalone question retrieves the top chunks, which are stuffed
//!    into [`QA_SYSTEM_PROMPT`]; the model answers from that prompt, the
//!    history and the original input.
//!
//! [`QA_SYSTEM_PROMPT`]: crate::rag::prompts::QA_SYSTEM_PROMPT

use crate::llm::LLMClient;
use crate::memory::{to_role_pairs, ChatHistory};
use crate::rag::prompts::{qa_system_prompt, CONTEXTUALIZE_SYSTEM_PROMPT, DOCUMENT_SEPARATOR};
use crate::rag::retriever::Retriever;
use crate::types::{Message, MessageRole, Result, SearchResult};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Result of one chain invocation.
#[derive(Debug, Clone)]
pub struct RagAnswer {
    pub answer: String,
    /// Query the chunks were retrieved with.
    pub standalone_query: String,
    /// Chunks the answer was grounded on, best first.
    pub context: Vec<SearchResult>,
}

pub struct RagChain {
    llm: Arc<dyn LLMClient>,
    retriever: Retriever,
    history_window: usize,
}

impl RagChain {
    pub fn new(llm: Arc<dyn LLMClient>, retriever: Retriever) -> Self {
        Self {
            llm,
            retriever,
            history_window: 0,
        }
    }

    /// Send only the last `window` history messages to the model (0 sends all).
    pub fn with_history_window(mut self, window: usize) -> Self {
        self.history_window = window;
        self
    }

    /// Answer `input` in the context of `history`.
    ///
    /// `history` is read only; recording the turn is left to the caller.
    #[instrument(skip_all, fields(turns = history.turns()))]
    pub async fn invoke(&self, input: &str, history: &ChatHistory) -> Result<RagAnswer> {
        let recent = history.window(self.history_window);

        let standalone_query = if recent.is_empty() {
            input.to_string()
        } else {
            let messages = conversation(CONTEXTUALIZE_SYSTEM_PROMPT, &recent, input);
            let rewritten = self.llm.generate_with_history(&messages).await?;
            debug!(query = %rewritten, "Contextualized question");
            rewritten
        };

        let context = self.retriever.retrieve(&standalone_query).await?;
        let stuffed = context
            .iter()
            .map(|r| r.document.content.as_str())
            .collect::<Vec<_>>()
            .join(DOCUMENT_SEPARATOR);

        let messages = conversation(&qa_system_prompt(&stuffed), &recent, input);
        let answer = self.llm.generate_with_history(&messages).await?;

        Ok(RagAnswer {
            answer,
            standalone_query,
            context,
        })
    }
}

/// System prompt, then the history, then the new user input.
fn conversation(system: &str, history: &[Message], input: &str) -> Vec<(String, String)> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push((MessageRole::System.as_str().to_string(), system.to_string()));
    messages.extend(to_role_pairs(history));
    messages.push((MessageRole::User.as_str().to_string(), input.to_string()));
    messages
}
