//! In-memory vector index over embedded chunks.
//!
//! Search is an exact linear scan by cosine similarity. Results are ordered by
//! descending similarity, with ties resolved by insertion order, so an index
//! restored from disk answers identically to the one that was saved.


use tracing::{debug, info};

use crate::embeddings::{Chunk, EmbeddingProvider};
use crate::{AssistantError, Result};

/// A chunk together with its embedding vector
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedChunk {
    pub chunk: Chunk,
    pub vector: Vec<f32>,
}

/// A single nearest-neighbour hit
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult<'a> {
    pub chunk: &'a Chunk,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VectorIndex {
    entries: Vec<IndexedChunk>,
    dimension: usize,
    model: String,
}

impl VectorIndex {
    /// Embed every chunk and collect the pairs.
    ///
    /// Fails with [`AssistantError::NoDocuments`] for an empty chunk set and with
    /// [`AssistantError::IndexBuild`] if any embedding call fails.
    #[inline]
    pub fn build(chunks: Vec<Chunk>, embedder: &dyn EmbeddingProvider) -> Result<Self> {
        if chunks.is_empty() {
            return Err(AssistantError::NoDocuments(
                "no chunks to index".to_string(),
            ));
        }

        info!(
            "Embedding {} chunks with model {}",
            chunks.len(),
            embedder.model_name()
        );

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let vectors = embedder
            .embed_batch(&texts)
            .map_err(|e| AssistantError::IndexBuild(format!("embedding failed: {:#}", e)))?;

        if vectors.len() != chunks.len() {
            return Err(AssistantError::IndexBuild(format!(
                "embedding provider returned {} vectors for {} chunks",
                vectors.len(),
                chunks.len()
            )));
        }

        let entries = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| IndexedChunk { chunk, vector })
            .collect();

        Self::from_entries(entries, embedder.model_name())
            .map_err(|e| AssistantError::IndexBuild(e.to_string()))
    }

    /// Assemble an index from already-embedded chunks, checking that all vectors agree in size
    #[inline]
    pub fn from_entries(entries: Vec<IndexedChunk>, model: &str) -> Result<Self> {
        let dimension = entries.first().map_or(0, |e| e.vector.len());

        if let Some(bad) = entries.iter().find(|e| e.vector.len() != dimension) {
            return Err(AssistantError::Database(format!(
                "chunk {} has {} dimensions, expected {}",
                bad.chunk.id,
                bad.vector.len(),
                dimension
            )));
        }
        if !entries.is_empty() && dimension == 0 {
            return Err(AssistantError::Database(
                "embedding vectors must not be empty".to_string(),
            ));
        }

        debug!(
            "Created vector index with {} entries of dimension {}",
            entries.len(),
            dimension
        );

        Ok(Self {
            entries,
            dimension,
            model: model.to_string(),
        })
    }

    /// Return up to `k` chunks most similar to `query`, best first.
    ///
    /// An empty index yields an empty list. `k` must be at least 1 and the query must
    /// match the index dimension.
    #[inline]
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult<'_>>> {
        if k == 0 {
            return Err(AssistantError::Retrieval(
                "k must be at least 1".to_string(),
            ));
        }
        if self.entries.is_empty() {
            return Ok(Vec::new());
        }
        if query.len() != self.dimension {
            return Err(AssistantError::Retrieval(format!(
                "query has {} dimensions but the index uses {}",
                query.len(),
                self.dimension
            )));
        }

        let mut scored: Vec<SearchResult<'_>> = self
            .entries
            .iter()
            .map(|entry| SearchResult {
                chunk: &entry.chunk,
                score: cosine_similarity(query, &entry.vector),
            })
            .collect();

        // Stable sort keeps insertion order among equal scores
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(k);

        debug!(
            "Vector search returned {} of {} chunks",
            scored.len(),
            self.entries.len()
        );
        Ok(scored)
    }

    #[inline]
    pub fn entries(&self) -> &[IndexedChunk] {
        &self.entries
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Embedding model the vectors were produced with
    #[inline]
    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Cosine similarity; zero-length vectors score 0
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let (dot, norm_a, norm_b) = a
        .iter()
        .zip(b)
        .fold((0.0_f32, 0.0_f32, 0.0_f32), |(dot, na, nb), (x, y)| {
            (x.mul_add(*y, dot), x.mul_add(*x, na), y.mul_add(*y, nb))
        });

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}
