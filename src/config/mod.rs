// Configuration management module
// TOML settings plus environment-provided API credentials

pub mod display;
pub mod settings;

pub use display::show_config;
pub use settings::{
    ChatConfig, Config, ConfigError, EmbeddingConfig, RetrievalConfig, SearchConfig, Secrets,
};
