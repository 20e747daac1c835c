
use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::documents::{Document, DocumentKind};

/// A bounded window of a document's text, ready for embedding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Stable identifier, preserved across index persistence
    pub id: String,
    /// Source path of the parent document
    pub source: String,
    /// Row of the parent document when it came from the rentals table
    pub row: Option<usize>,
    pub kind: DocumentKind,
    /// Position of this chunk within its document
    pub chunk_index: usize,
    /// Offset of the first character within the document text, in chars
    pub char_offset: usize,
    pub content: String,
}

/// Configuration for content chunking, measured in characters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk length
    pub chunk_size: usize,
    /// Characters shared by consecutive chunks of the same document
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 150,
        }
    }
}

impl ChunkingConfig {
    /// Distance between the starts of consecutive chunks
    #[inline]
    pub fn stride(&self) -> usize {
        self.chunk_size - self.chunk_overlap
    }

    #[inline]
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            bail!("Chunk size must be greater than 0");
        }
        if self.chunk_overlap >= self.chunk_size {
            bail!(
                "Chunk overlap ({}) must be smaller than chunk size ({})",
                self.chunk_overlap,
                self.chunk_size
            );
        }
        Ok(())
    }
}

/// Split one document into overlapping windows.
///
/// Every chunk holds at most `chunk_size` characters and starts `stride()` characters
/// after its predecessor, so neighbours share exactly `chunk_overlap` characters.
#[inline]
pub fn chunk_document(document: &Document, config: &ChunkingConfig) -> Result<Vec<Chunk>> {
    config.validate()?;

    let chars: Vec<char> = document.text.chars().collect();
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let end = (start + config.chunk_size).min(chars.len());

        chunks.push(Chunk {
            id: Uuid::new_v4().to_string(),
            source: document.source.clone(),
            row: document.row,
            kind: document.kind,
            chunk_index: chunks.len(),
            char_offset: start,
            content: chars[start..end].iter().collect(),
        });

        if end == chars.len() {
            break;
        }
        start += config.stride();
    }

    Ok(chunks)
}

/// Chunk every document, preserving document order
#[inline]
pub fn chunk_documents(documents: &[Document], config: &ChunkingConfig) -> Result<Vec<Chunk>> {
    let mut chunks = Vec::new();
    for document in documents {
        chunks.extend(chunk_document(document, config)?);
    }

    debug!(
        "Chunked {} documents into {} chunks (size {}, overlap {})",
        documents.len(),
        chunks.len(),
        config.chunk_size,
        config.chunk_overlap
    );

    Ok(chunks)
}

/// Rebuild a document's text from its chunks by dropping each chunk's overlap
/// with the next one.
#[inline]
pub fn merge_chunks(chunks: &[Chunk], config: &ChunkingConfig) -> String {
    let mut text = String::new();
    for (i, chunk) in chunks.iter().enumerate() {
        if i + 1 == chunks.len() {
            text.push_str(&chunk.content);
        } else {
            text.extend(chunk.content.chars().take(config.stride()));
        }
    }
    text
}
