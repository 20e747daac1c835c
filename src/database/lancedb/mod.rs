// LanceDB-backed persistence for the vector index
// One table holds (chunk, vector) rows; a JSON sidecar records how the index was built


pub mod vector_store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use vector_store::IndexStore;

/// File name of the metadata sidecar inside the index directory
pub const METADATA_FILE_NAME: &str = "index_meta.json";

/// Build information stored next to the LanceDB table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexMetadata {
    /// Embedding model used for every vector in the table
    pub model: String,
    pub dimension: usize,
    pub chunk_count: usize,
    pub built_at: DateTime<Utc>,
}

impl IndexMetadata {
    #[inline]
    pub fn new(model: &str, dimension: usize, chunk_count: usize) -> Self {
        Self {
            model: model.to_string(),
            dimension,
            chunk_count,
            built_at: Utc::now(),
        }
    }
}
