#![allow(
    dead_code,
    reason = "each integration test binary uses a subset of these helpers"
)]

use rental_assistant::config::{Config, Secrets};
use rental_assistant::embeddings::EmbeddingProvider;
use serde_json::{Value, json};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const EMBEDDING_MODEL: &str = "all-minilm";

/// 26-dimensional letter histogram, a deterministic stand-in for a real embedding
pub fn letter_histogram(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0; 26];
    for c in text.chars().filter(char::is_ascii_alphabetic) {
        let slot = (c.to_ascii_lowercase() as u8 - b'a') as usize;
        vector[slot] += 1.0;
    }
    vector
}

#[derive(Debug, Default)]
pub struct LetterEmbedder {
    pub calls: AtomicUsize,
}

impl EmbeddingProvider for LetterEmbedder {
    fn model_name(&self) -> &str {
        EMBEDDING_MODEL
    }

    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(letter_histogram(text))
    }

    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| letter_histogram(t)).collect())
    }
}

/// Answers `/api/embed` with one letter histogram per input
struct EmbedResponder;

impl Respond for EmbedResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).expect("embed request is json");
        let embeddings: Vec<Vec<f32>> = match &body["input"] {
            Value::Array(items) => items
                .iter()
                .map(|item| letter_histogram(item.as_str().unwrap_or_default()))
                .collect(),
            Value::String(text) => vec![letter_histogram(text)],
            _ => Vec::new(),
        };
        ResponseTemplate::new(200).set_body_json(json!({
            "model": EMBEDDING_MODEL,
            "embeddings": embeddings,
        }))
    }
}

pub async fn mount_ollama(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [{"name": format!("{}:latest", EMBEDDING_MODEL), "size": 45_960_996}]
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(EmbedResponder)
        .mount(server)
        .await;
}

pub async fn mount_groq(server: &MockServer, reply: &str) {
    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .and(header("authorization", "Bearer gsk_test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": reply},
                "finish_reason": "stop"
            }]
        })))
        .mount(server)
        .await;
}

pub async fn mount_google(server: &MockServer, items: Value) {
    Mock::given(method("GET"))
        .and(path("/customsearch/v1"))
        .and(query_param("key", "google-key"))
        .and(query_param("cx", "engine-id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "kind": "customsearch#search",
            "items": items
        })))
        .mount(server)
        .await;
}

/// Configuration pointing every provider at `server`, with all secrets set
pub fn mock_config(base_dir: &Path, server: &MockServer) -> Config {
    let mut config = Config {
        base_dir: base_dir.to_path_buf(),
        secrets: Secrets {
            groq_api_key: Some("gsk_test".to_string()),
            google_api_key: Some("google-key".to_string()),
            google_cse_id: Some("engine-id".to_string()),
        },
        ..Config::default()
    };
    config.embedding.protocol = "http".to_string();
    config.embedding.host = server.address().ip().to_string();
    config.embedding.port = server.address().port();
    config.embedding.model = EMBEDDING_MODEL.to_string();
    config.chat.endpoint = format!("{}/openai/v1/", server.uri());
    config.search.endpoint = format!("{}/customsearch/v1", server.uri());
    config
}

/// Run blocking provider calls from inside a multi-threaded test runtime
pub fn blocking<F: std::future::Future>(future: F) -> F::Output {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

/// Bodies of every request the server received on `request_path`
pub async fn request_bodies(server: &MockServer, request_path: &str) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|request| request.url.path() == request_path)
        .map(|request| serde_json::from_slice(&request.body).unwrap_or(Value::Null))
        .collect()
}
