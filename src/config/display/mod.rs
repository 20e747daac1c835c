
use console::style;

use super::Config;

/// Human-readable (label, value) pairs describing the effective configuration
#[inline]
pub fn describe_config(config: &Config) -> Vec<(&'static str, String)> {
    let presence = |value: Option<&String>| {
        if value.is_some() {
            "set".to_string()
        } else {
            "not set".to_string()
        }
    };

    let embedding_url = config
        .embedding_url()
        .map_or_else(|e| format!("invalid ({})", e), |url| url.to_string());

    vec![
        ("Data folder", config.data_path().display().to_string()),
        ("Rentals table", config.rentals_file.clone()),
        ("Index location", config.index_path().display().to_string()),
        ("Embedding URL", embedding_url),
        ("Embedding model", config.embedding.model.clone()),
        ("Chat endpoint", config.chat.endpoint.clone()),
        ("Chat model", config.chat.model.clone()),
        ("Search endpoint", config.search.endpoint.clone()),
        ("Search results", config.search.result_count.to_string()),
        (
            "Chunking",
            format!(
                "{} chars, {} overlap",
                config.chunking.chunk_size, config.chunking.chunk_overlap
            ),
        ),
        ("Top k", config.retrieval.top_k.to_string()),
        ("GROQ_API_KEY", presence(config.secrets.groq_api_key.as_ref())),
        (
            "GOOGLE_API_KEY",
            presence(config.secrets.google_api_key.as_ref()),
        ),
        ("GOOGLE_CSE_ID", presence(config.secrets.google_cse_id.as_ref())),
    ]
}

#[inline]
pub fn show_config(config: &Config) {
    eprintln!("{}", style("📋 Current Configuration").bold().cyan());
    eprintln!();

    for (label, value) in describe_config(config) {
        let value = match value.as_str() {
            "not set" => style(value).red(),
            "set" => style(value).green(),
            _ => style(value).cyan(),
        };
        eprintln!("  {}: {}", style(label).bold(), value);
    }

    eprintln!();
    if !config.secrets.search_configured() {
        eprintln!(
            "{}",
            style("⚠ Web search is not configured; answers will rely on the local index only.")
                .yellow()
        );
    }
    eprintln!(
        "Config file: {}",
        style(config.config_file_path().display()).dim()
    );
}
