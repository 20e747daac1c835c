// Database module
// Durable storage for the vector index (LanceDB table plus a JSON metadata sidecar)

pub mod lancedb;

pub use self::lancedb::{IndexMetadata, IndexStore};
