// Embeddings module
// Text chunking plus the embedding provider seam (Ollama-backed by default)

pub mod chunking;
pub mod ollama;

use anyhow::Result;

pub use chunking::{Chunk, ChunkingConfig, chunk_document, chunk_documents, merge_chunks};
pub use ollama::OllamaClient;

/// Maps text to fixed-dimension vectors.
///
/// Queries must be embedded by the same provider (and model) that built the index.
pub trait EmbeddingProvider: Send + Sync {
    /// Identity of the underlying model, recorded alongside persisted indexes
    fn model_name(&self) -> &str;

    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}
