// Indexer module
// Turns the document folder into a vector index and decides when to reuse the persisted one

#[cfg(test)]
mod tests;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::Config;
use crate::database::IndexStore;
use crate::documents::load_documents;
use crate::embeddings::{ChunkingConfig, EmbeddingProvider, chunk_documents};
use crate::index::VectorIndex;
use crate::{AssistantError, Result};

/// Builds, persists and restores the knowledge-base index
pub struct Indexer {
    data_dir: PathBuf,
    rentals_file: String,
    chunking: ChunkingConfig,
    store: IndexStore,
    embedder: Arc<dyn EmbeddingProvider>,
}

/// Statistics about a completed build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexingStats {
    pub documents_loaded: usize,
    pub chunks_created: usize,
}

impl Indexer {
    #[inline]
    pub fn new(config: &Config, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            data_dir: config.data_path(),
            rentals_file: config.rentals_file.clone(),
            chunking: config.chunking.clone(),
            store: IndexStore::new(config.index_path()),
            embedder,
        }
    }

    #[inline]
    pub fn store(&self) -> &IndexStore {
        &self.store
    }

    /// Scan the document folder, chunk every document and embed the chunks.
    ///
    /// Fails with [`AssistantError::NoDocuments`] when the folder is absent or holds
    /// nothing loadable, and with [`AssistantError::IndexBuild`] when embedding fails.
    #[inline]
    pub fn build(&self) -> Result<(VectorIndex, IndexingStats)> {
        let documents = load_documents(&self.data_dir, &self.rentals_file)
            .map_err(|e| AssistantError::IndexBuild(format!("{:#}", e)))?;
        if documents.is_empty() {
            return Err(AssistantError::NoDocuments(
                self.data_dir.display().to_string(),
            ));
        }

        let chunks = chunk_documents(&documents, &self.chunking)
            .map_err(|e| AssistantError::IndexBuild(format!("{:#}", e)))?;
        let stats = IndexingStats {
            documents_loaded: documents.len(),
            chunks_created: chunks.len(),
        };
        info!(
            "Embedding {} chunks from {} documents with model {}",
            stats.chunks_created,
            stats.documents_loaded,
            self.embedder.model_name()
        );

        let index = VectorIndex::build(chunks, self.embedder.as_ref())?;
        Ok((index, stats))
    }

    /// Load the persisted index if there is one, otherwise build and persist it.
    ///
    /// Build failures (no documents, embedding errors) degrade to `Ok(None)` so the
    /// assistant can run on web search alone; storage failures are returned.
    #[inline]
    pub async fn load_or_build(&self) -> Result<Option<VectorIndex>> {
        if let Some(index) = self.store.load().await? {
            if index.model() != self.embedder.model_name() {
                warn!(
                    "Index at {} was built with '{}' but queries use '{}'; run `index --rebuild`",
                    self.store.path().display(),
                    index.model(),
                    self.embedder.model_name()
                );
            }
            return Ok(Some(index));
        }

        info!(
            "No persisted index at {}, building from {}",
            self.store.path().display(),
            self.data_dir.display()
        );
        match self.build() {
            Ok((index, stats)) => {
                self.store.save(&index).await?;
                info!(
                    "Indexed {} documents into {} chunks",
                    stats.documents_loaded, stats.chunks_created
                );
                Ok(Some(index))
            }
            Err(e @ (AssistantError::NoDocuments(_) | AssistantError::IndexBuild(_))) => {
                warn!("Running without a knowledge base: {}", e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Build from scratch and overwrite whatever is persisted
    #[inline]
    pub async fn rebuild(&self) -> Result<(VectorIndex, IndexingStats)> {
        let (index, stats) = self.build()?;
        self.store.save(&index).await?;
        info!(
            "Rebuilt index with {} chunks at {}",
            index.len(),
            self.store.path().display()
        );
        Ok((index, stats))
    }
}
