// Deterministic provider doubles shared by the unit tests

use anyhow::{Result, anyhow};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::documents::DocumentKind;
use crate::embeddings::{Chunk, EmbeddingProvider};
use crate::llm::{ChatMessage, ChatModel};
use crate::search::{SearchError, SearchHit, WebSearch};

/// Embeds text as a 26-dimensional letter histogram
#[derive(Debug, Default)]
pub(crate) struct LetterEmbedder {
    pub calls: AtomicUsize,
}

pub(crate) fn letter_histogram(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0; 26];
    for c in text.chars().filter(char::is_ascii_alphabetic) {
        let slot = (c.to_ascii_lowercase() as u8 - b'a') as usize;
        vector[slot] += 1.0;
    }
    vector
}

impl EmbeddingProvider for LetterEmbedder {
    fn model_name(&self) -> &str {
        "letter-histogram"
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(letter_histogram(text))
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| letter_histogram(t)).collect())
    }
}

/// Always fails, as an unreachable embedding server would
#[derive(Debug, Default)]
pub(crate) struct FailingEmbedder;

impl EmbeddingProvider for FailingEmbedder {
    fn model_name(&self) -> &str {
        "failing"
    }

    fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(anyhow!("embedding server unavailable"))
    }

    fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(anyhow!("embedding server unavailable"))
    }
}

/// Replies from a script, recording every prompt it receives
#[derive(Debug, Default)]
pub(crate) struct ScriptedChatModel {
    replies: Mutex<VecDeque<Result<String, String>>>,
    pub requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedChatModel {
    pub(crate) fn new(replies: Vec<Result<&str, &str>>) -> Self {
        Self {
            replies: Mutex::new(
                replies
                    .into_iter()
                    .map(|r| r.map(str::to_string).map_err(str::to_string))
                    .collect(),
            ),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn request_count(&self) -> usize {
        self.requests.lock().expect("lock should not be poisoned").len()
    }

    pub(crate) fn request(&self, index: usize) -> Vec<ChatMessage> {
        self.requests.lock().expect("lock should not be poisoned")[index].clone()
    }
}

impl ChatModel for ScriptedChatModel {
    fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        self.requests
            .lock()
            .expect("lock should not be poisoned")
            .push(messages.to_vec());
        self.replies
            .lock()
            .expect("lock should not be poisoned")
            .pop_front()
            .unwrap_or_else(|| Ok("default reply".to_string()))
            .map_err(|e| anyhow!(e))
    }
}

/// Returns fixed hits and counts calls
#[derive(Debug, Default)]
pub(crate) struct CountingSearch {
    pub calls: AtomicUsize,
    pub queries: Mutex<Vec<String>>,
    pub hits: Vec<SearchHit>,
    pub configured: bool,
}

impl CountingSearch {
    pub(crate) fn with_hits(hits: Vec<SearchHit>) -> Self {
        Self {
            hits,
            configured: true,
            ..Self::default()
        }
    }
}

impl WebSearch for CountingSearch {
    fn search(&self, query: &str, count: u32) -> Result<Vec<SearchHit>, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries
            .lock()
            .expect("lock should not be poisoned")
            .push(query.to_string());
        if !self.configured {
            return Err(SearchError::NotConfigured);
        }
        Ok(self.hits.iter().take(count as usize).cloned().collect())
    }
}

pub(crate) fn hit(title: &str, snippet: &str) -> SearchHit {
    SearchHit {
        title: title.to_string(),
        link: format!("https://example.com/{}", title.to_lowercase().replace(' ', "-")),
        snippet: snippet.to_string(),
    }
}

pub(crate) fn text_chunk(id: &str, content: &str) -> Chunk {
    Chunk {
        id: id.to_string(),
        source: format!("data/{}.txt", id),
        row: None,
        kind: DocumentKind::FreeText,
        chunk_index: 0,
        char_offset: 0,
        content: content.to_string(),
    }
}
