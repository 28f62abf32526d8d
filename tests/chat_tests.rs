//! End-to-end tests of the console flow: choosing an index, then chatting
//! over it, with mocked model and embeddings.

mod common {
    pub mod mocks;
}

use common::mocks::{MockEmbedder, MockLLMClient};
use ragchat::chat::setup::{prepare_index, select_source, SourceChoice, NO_INDEX_MESSAGE, SOURCE_PROMPT};
use ragchat::chat::{ChatSession, BANNER_RULE, BANNER_TITLE, BOT_PREFIX, USER_PROMPT};
use ragchat::db::{index_exists, VectorStore};
use ragchat::rag::chain::RagChain;
use ragchat::rag::prompts::CONTEXTUALIZE_SYSTEM_PROMPT;
use ragchat::rag::retriever::Retriever;
use ragchat::types::{AppError, MessageRole};
use ragchat::utils::toml_config::RagConfig;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn write_docs(dir: &Path) {
    std::fs::write(
        dir.join("rust.txt"),
        "Rust is a systems programming language focused on safety and speed.",
    )
    .unwrap();
    std::fs::write(
        dir.join("tea.md"),
        "Green tea is steeped at around eighty degrees for two minutes.",
    )
    .unwrap();
}

async fn session_over(
    store: Arc<dyn VectorStore>,
    embedder: MockEmbedder,
    llm: MockLLMClient,
) -> ChatSession {
    let retriever = Retriever::from_config(&RagConfig::default(), store, Arc::new(embedder));
    ChatSession::new(RagChain::new(Arc::new(llm), retriever))
}

async fn run_session(session: &mut ChatSession, input: &str) -> (ragchat::Result<()>, String) {
    let mut reader = Cursor::new(input.as_bytes().to_vec());
    let mut out = Vec::new();
    let result = session.run(&mut reader, &mut out).await;
    (result, String::from_utf8(out).unwrap())
}

async fn built_index(docs: &Path, index_dir: &Path) -> Arc<dyn VectorStore> {
    let choice = SourceChoice::Folder(docs.to_path_buf());
    let (store, report) = prepare_index(
        &choice,
        index_dir,
        &RagConfig::default(),
        Arc::new(MockEmbedder::new()),
    )
    .await
    .unwrap();
    assert_eq!(report.unwrap().files, 2);
    store
}

#[tokio::test]
async fn test_nonexistent_folder_reprompts_then_builds() {
    let docs = TempDir::new().unwrap();
    write_docs(docs.path());
    let index = TempDir::new().unwrap();
    let index_dir = index.path().join("idx");

    let input = format!("./definitely/not/here\n{}\n", docs.path().display());
    let mut reader = Cursor::new(input.into_bytes());
    let mut out = Vec::new();

    let choice = select_source(&mut reader, &mut out, &index_dir)
        .unwrap()
        .unwrap();
    let out = String::from_utf8(out).unwrap();

    assert!(out.contains("Folder './definitely/not/here' does not exist."));
    assert_eq!(out.matches(SOURCE_PROMPT).count(), 2);
    assert_eq!(choice, SourceChoice::Folder(docs.path().to_path_buf()));

    let embedder = MockEmbedder::new();
    let (store, report) = prepare_index(
        &choice,
        &index_dir,
        &RagConfig::default(),
        Arc::new(embedder.clone()),
    )
    .await
    .unwrap();

    assert_eq!(report.unwrap().chunks, 2);
    assert_eq!(store.count("documents").await.unwrap(), 2);
    assert_eq!(embedder.text_count(), 2);
    assert!(index_exists(&index_dir));
}

#[tokio::test]
async fn test_skip_without_index_reprompts() {
    let index = TempDir::new().unwrap();
    let docs = TempDir::new().unwrap();
    let index_dir = index.path().join("idx");

    let input = format!("skip\nSKIP\n{}\n", docs.path().display());
    let mut reader = Cursor::new(input.into_bytes());
    let mut out = Vec::new();

    let choice = select_source(&mut reader, &mut out, &index_dir)
        .unwrap()
        .unwrap();
    let out = String::from_utf8(out).unwrap();

    assert_eq!(out.matches(NO_INDEX_MESSAGE).count(), 2);
    assert_eq!(out.matches(SOURCE_PROMPT).count(), 3);
    assert!(matches!(choice, SourceChoice::Folder(_)));
}

#[tokio::test]
async fn test_skip_with_index_reuses_without_rebuilding() {
    let docs = TempDir::new().unwrap();
    write_docs(docs.path());
    let index = TempDir::new().unwrap();
    let index_dir = index.path().join("idx");

    built_index(docs.path(), &index_dir).await;
    // the folder is gone; reuse must not need it
    drop(docs);

    let mut reader = Cursor::new(b"skip\n".to_vec());
    let mut out = Vec::new();
    let choice = select_source(&mut reader, &mut out, &index_dir)
        .unwrap()
        .unwrap();
    assert_eq!(choice, SourceChoice::Reuse);

    let embedder = MockEmbedder::new();
    let (store, report) = prepare_index(
        &choice,
        &index_dir,
        &RagConfig::default(),
        Arc::new(embedder.clone()),
    )
    .await
    .unwrap();

    assert!(report.is_none());
    assert_eq!(embedder.call_count(), 0);
    assert_eq!(store.count("documents").await.unwrap(), 2);
}

#[tokio::test]
async fn test_chat_stops_on_exit_and_quit() {
    for exit in ["exit", "quit", "EXIT", "Quit"] {
        let docs = TempDir::new().unwrap();
        write_docs(docs.path());
        let index = TempDir::new().unwrap();
        let store = built_index(docs.path(), &index.path().join("idx")).await;

        let llm = MockLLMClient::new("An answer.");
        let mut session = session_over(store, MockEmbedder::new(), llm.clone()).await;

        let input = format!("What is Rust?\n{}\nnever asked\n", exit);
        let (result, out) = run_session(&mut session, &input).await;

        result.unwrap();
        assert_eq!(session.history().turns(), 1, "stopped on {}", exit);
        assert_eq!(llm.call_count(), 1);
        assert_eq!(out.matches(USER_PROMPT).count(), 2);
        assert!(!out.contains("never asked"));
    }
}

#[tokio::test]
async fn test_padded_exit_is_a_question() {
    let docs = TempDir::new().unwrap();
    write_docs(docs.path());
    let index = TempDir::new().unwrap();
    let store = built_index(docs.path(), &index.path().join("idx")).await;

    let mut session = session_over(store, MockEmbedder::new(), MockLLMClient::new("ok")).await;
    let (result, _) = run_session(&mut session, " exit\nexit\n").await;

    result.unwrap();
    assert_eq!(session.history().turns(), 1);
    assert_eq!(session.history().messages()[0].content, " exit");
}

#[tokio::test]
async fn test_each_turn_appends_human_then_ai() {
    let docs = TempDir::new().unwrap();
    write_docs(docs.path());
    let index = TempDir::new().unwrap();
    let store = built_index(docs.path(), &index.path().join("idx")).await;

    let llm = MockLLMClient::scripted(
        &[
            "Rust is a systems language.",
            "How fast is the Rust language?",
            "It is fast.",
        ],
        "unused",
    );
    let mut session = session_over(store, MockEmbedder::new(), llm.clone()).await;

    let (result, out) = run_session(&mut session, "What is Rust?\nIs it fast?\n").await;
    result.unwrap();

    let messages = session.history().messages();
    let roles: Vec<MessageRole> = messages.iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![
            MessageRole::User,
            MessageRole::Assistant,
            MessageRole::User,
            MessageRole::Assistant
        ]
    );
    assert_eq!(messages[0].content, "What is Rust?");
    assert_eq!(messages[1].content, "Rust is a systems language.");
    assert_eq!(messages[2].content, "Is it fast?");
    assert_eq!(messages[3].content, "It is fast.");

    assert!(out.starts_with(&format!("{}\n{}\n{}\n", BANNER_RULE, BANNER_TITLE, BANNER_RULE)));
    assert!(out.contains(&format!("{}Rust is a systems language.\n", BOT_PREFIX)));
    assert!(out.contains(&format!("{}It is fast.\n", BOT_PREFIX)));
}

#[tokio::test]
async fn test_follow_up_is_contextualized_before_retrieval() {
    let docs = TempDir::new().unwrap();
    write_docs(docs.path());
    let index = TempDir::new().unwrap();
    let store = built_index(docs.path(), &index.path().join("idx")).await;

    let llm = MockLLMClient::scripted(
        &[
            "Rust is a systems language.",
            "At what temperature is green tea steeped?",
            "About eighty degrees.",
        ],
        "unused",
    );
    let mut session = session_over(store, MockEmbedder::new(), llm.clone()).await;

    let (result, _) = run_session(&mut session, "What is Rust?\nAnd the tea?\n").await;
    result.unwrap();

    let calls = llm.calls();
    assert_eq!(calls.len(), 3);

    // first turn: no history, straight to answering
    assert_eq!(calls[0].len(), 2);
    assert!(calls[0][0].1.starts_with("You are an assistant for question-answering tasks."));
    assert_eq!(calls[0][1], ("user".to_string(), "What is Rust?".to_string()));

    // second turn: rewrite with history, then answer with history
    assert_eq!(calls[1][0], ("system".to_string(), CONTEXTUALIZE_SYSTEM_PROMPT.to_string()));
    assert_eq!(calls[1].len(), 4);
    assert_eq!(calls[1][3].1, "And the tea?");

    let qa_system = &calls[2][0].1;
    assert!(qa_system.contains("Green tea is steeped"));
    assert_eq!(calls[2].len(), 4);
    assert_eq!(calls[2][1], ("user".to_string(), "What is Rust?".to_string()));
    assert_eq!(
        calls[2][2],
        ("assistant".to_string(), "Rust is a systems language.".to_string())
    );
}

#[tokio::test]
async fn test_end_of_input_ends_chat() {
    let docs = TempDir::new().unwrap();
    write_docs(docs.path());
    let index = TempDir::new().unwrap();
    let store = built_index(docs.path(), &index.path().join("idx")).await;

    let mut session = session_over(store, MockEmbedder::new(), MockLLMClient::new("ok")).await;
    let (result, _) = run_session(&mut session, "").await;

    result.unwrap();
    assert!(session.history().is_empty());
}

#[tokio::test]
async fn test_model_failure_is_fatal() {
    let docs = TempDir::new().unwrap();
    write_docs(docs.path());
    let index = TempDir::new().unwrap();
    let store = built_index(docs.path(), &index.path().join("idx")).await;

    let mut session = session_over(store, MockEmbedder::new(), MockLLMClient::failing()).await;
    let (result, _) = run_session(&mut session, "hello\nexit\n").await;

    assert!(matches!(result, Err(AppError::LLM(_))));
    assert!(session.history().is_empty());
}

#[tokio::test]
async fn test_show_sources_lists_chunks() {
    let docs = TempDir::new().unwrap();
    write_docs(docs.path());
    let index = TempDir::new().unwrap();
    let store = built_index(docs.path(), &index.path().join("idx")).await;

    let mut session = session_over(store, MockEmbedder::new(), MockLLMClient::new("ok"))
        .await
        .with_show_sources(true);
    let (result, out) = run_session(&mut session, "green tea\nquit\n").await;

    result.unwrap();
    assert!(out.contains("Sources:"));
    assert!(out.contains("[1] tea.md (chunk 0"));
}
