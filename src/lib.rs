use thiserror::Error;

pub type Result<T> = std::result::Result<T, AssistantError>;

#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to initialize resource: {0}")]
    ResourceLoad(String),

    #[error("No documents found in '{0}'")]
    NoDocuments(String),

    #[error("Index build error: {0}")]
    IndexBuild(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Retrieval error: {0}")]
    Retrieval(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub mod assistant;
pub mod commands;
pub mod config;
pub mod database;
pub mod documents;
pub mod embeddings;
mod http;
pub mod index;
pub mod indexer;
pub mod llm;
pub mod resources;
pub mod retrieval;
pub mod search;
#[cfg(test)]
mod test_support;
