// Retrieval module
// Query text -> knowledge-base context string for prompt assembly


use itertools::Itertools;
use tracing::{debug, warn};

use crate::embeddings::EmbeddingProvider;
use crate::index::VectorIndex;
use crate::search::CONTEXT_SEPARATOR;

pub const DEFAULT_TOP_K: usize = 5;

pub const NO_KNOWLEDGE_BASE_MESSAGE: &str = "No local knowledge base found.";
pub const RETRIEVAL_FAILED_MESSAGE: &str = "Could not retrieve context due to an error.";
pub const NO_MATCHES_MESSAGE: &str = "The local knowledge base returned no matching documents.";

/// Embed `query`, take the `k` nearest chunks and join their text.
///
/// Never fails: a missing index, an empty index or an embedding error each produce
/// a placeholder so the turn can still be answered from web search.
#[inline]
pub fn retrieve(
    index: Option<&VectorIndex>,
    embedder: &dyn EmbeddingProvider,
    query: &str,
    k: usize,
) -> String {
    let Some(index) = index else {
        debug!("Retrieval skipped: no knowledge base loaded");
        return NO_KNOWLEDGE_BASE_MESSAGE.to_string();
    };

    let query_vector = match embedder.embed(query) {
        Ok(vector) => vector,
        Err(e) => {
            warn!("Error during retrieval: failed to embed query: {:#}", e);
            return RETRIEVAL_FAILED_MESSAGE.to_string();
        }
    };

    match index.search(&query_vector, k) {
        Ok(results) if results.is_empty() => NO_MATCHES_MESSAGE.to_string(),
        Ok(results) => {
            debug!(
                "Retrieved {} chunks, best score {:.3}",
                results.len(),
                results[0].score
            );
            results
                .iter()
                .map(|result| result.chunk.content.as_str())
                .join(CONTEXT_SEPARATOR)
        }
        Err(e) => {
            warn!("Error during retrieval: {}", e);
            RETRIEVAL_FAILED_MESSAGE.to_string()
        }
    }
}
