//! Prompt templates for the history-aware chain.

/// Placeholder in [`QA_SYSTEM_PROMPT`] replaced by the retrieved chunks.
pub const CONTEXT_PLACEHOLDER: &str = "{context}";

/// Turns a follow-up question into one that stands on its own.
pub const CONTEXTUALIZE_SYSTEM_PROMPT: &str = "Given a chat history and the latest user question \
which might reference context in the chat history, formulate a standalone question which can be \
understood without the chat history. Do NOT answer the question, just reformulate it if needed \
and otherwise return it as is.";

/// Answers from the retrieved context.
pub const QA_SYSTEM_PROMPT: &str = "You are an assistant for question-answering tasks. Use the \
following pieces of retrieved context to answer the question. If you don't know the answer, say \
that you don't know. Use three sentences maximum and keep the answer concise.\n\n{context}";

/// Separator between retrieved chunks inside `{context}`.
pub const DOCUMENT_SEPARATOR: &str = "\n\n";

/// The QA system prompt with `context` substituted.
pub fn qa_system_prompt(context: &str) -> String {
    QA_SYSTEM_PROMPT.replace(CONTEXT_PLACEHOLDER, context)
}
