//! Ollama Integration Tests with Mocked Network Responses
//!
//! These tests use wiremock to stand in for the Ollama HTTP API and drive
//! the real clients against it:
//! - Chat completions through `OllamaClient`
//! - Embeddings through `OllamaEmbedder`
//! - Error handling

#![cfg(feature = "ollama")]

use ragchat::llm::ollama::OllamaClient;
use ragchat::llm::{LLMClient, Provider};
use ragchat::rag::embeddings::{Embedder, OllamaEmbedder};
use ragchat::types::AppError;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============= Helper Functions =============

/// Create a mock Ollama chat completion response
fn mock_chat_response(content: &str) -> serde_json::Value {
    json!({
        "model": "llama3.2:latest",
        "created_at": "2024-01-01T00:00:00Z",
        "message": {
            "role": "assistant",
            "content": content
        },
        "done": true
    })
}

fn mock_embed_response(embeddings: Vec<Vec<f32>>) -> serde_json::Value {
    json!({
        "model": "nomic-embed-text",
        "embeddings": embeddings
    })
}

async fn client_for(server: &MockServer) -> OllamaClient {
    OllamaClient::new(server.uri(), "llama3.2:latest".to_string(), 0.5)
        .await
        .unwrap()
}

// ============= Chat Tests =============

#[tokio::test]
async fn test_generate_returns_message_content() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({ "model": "llama3.2:latest" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_chat_response("Hello!")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let reply = client.generate("Hi").await.unwrap();

    assert_eq!(reply, "Hello!");
    assert_eq!(client.model_name(), "llama3.2:latest");
}

#[tokio::test]
async fn test_temperature_is_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({ "options": { "temperature": 0.5 } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_chat_response("ok")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    assert_eq!(client.generate("Hi").await.unwrap(), "ok");
}

#[tokio::test]
async fn test_history_is_sent_in_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({
            "messages": [
                { "role": "system", "content": "Answer briefly." },
                { "role": "user", "content": "What is Rust?" },
                { "role": "assistant", "content": "A language." },
                { "role": "user", "content": "Is it fast?" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_chat_response("Yes.")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let history = vec![
        ("system".to_string(), "Answer briefly.".to_string()),
        ("user".to_string(), "What is Rust?".to_string()),
        ("assistant".to_string(), "A language.".to_string()),
        ("user".to_string(), "Is it fast?".to_string()),
    ];

    assert_eq!(client.generate_with_history(&history).await.unwrap(), "Yes.");
}

#[tokio::test]
async fn test_system_prompt_is_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({
            "messages": [
                { "role": "system", "content": "You are terse." },
                { "role": "user", "content": "Hello" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_chat_response("Hi.")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let reply = client
        .generate_with_system("You are terse.", "Hello")
        .await
        .unwrap();
    assert_eq!(reply, "Hi.");
}

#[tokio::test]
async fn test_server_error_is_llm_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    assert!(matches!(client.generate("Hi").await, Err(AppError::LLM(_))));
}

#[tokio::test]
async fn test_provider_creates_working_client() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_chat_response("From provider")))
        .mount(&mock_server)
        .await;

    let provider = Provider::Ollama {
        base_url: mock_server.uri(),
        model: "llama3.2:latest".to_string(),
        temperature: 0.5,
    };
    let client = provider.create_client().await.unwrap();

    assert_eq!(client.generate("Hi").await.unwrap(), "From provider");
}

// ============= Embedding Tests =============

#[tokio::test]
async fn test_embedder_returns_vectors_in_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .and(body_partial_json(json!({
            "model": "nomic-embed-text",
            "input": ["first", "second"]
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(mock_embed_response(vec![vec![1.0, 0.0], vec![0.0, 1.0]])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let embedder = OllamaEmbedder::new(&mock_server.uri(), "nomic-embed-text".to_string()).unwrap();
    let vectors = embedder
        .embed(&["first".to_string(), "second".to_string()])
        .await
        .unwrap();

    assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    assert_eq!(embedder.model_name(), "nomic-embed-text");
}

#[tokio::test]
async fn test_embedder_skips_request_for_empty_input() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_embed_response(vec![])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let embedder = OllamaEmbedder::new(&mock_server.uri(), "nomic-embed-text".to_string()).unwrap();
    assert!(embedder.embed(&[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_embedder_count_mismatch_is_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(mock_embed_response(vec![vec![1.0, 0.0]])),
        )
        .mount(&mock_server)
        .await;

    let embedder = OllamaEmbedder::new(&mock_server.uri(), "nomic-embed-text".to_string()).unwrap();
    let result = embedder
        .embed(&["first".to_string(), "second".to_string()])
        .await;

    assert!(matches!(result, Err(AppError::Embedding(_))));
}
