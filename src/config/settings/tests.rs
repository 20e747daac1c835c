use super::*;
use serial_test::serial;
use tempfile::TempDir;

fn clear_secret_vars() {
    // SAFETY: tests touching the environment are serialized with `#[serial]`
    unsafe {
        std::env::remove_var(GROQ_API_KEY_VAR);
        std::env::remove_var(GOOGLE_API_KEY_VAR);
        std::env::remove_var(GOOGLE_CSE_ID_VAR);
    }
}

#[test]
fn default_config() {
    let config = Config::default();
    assert_eq!(config.embedding.protocol, "http");
    assert_eq!(config.embedding.host, "localhost");
    assert_eq!(config.embedding.port, 11434);
    assert_eq!(config.embedding.model, "all-minilm");
    assert_eq!(config.chat.model, "llama3-70b-8192");
    assert_eq!(config.search.result_count, 3);
    assert_eq!(config.chunking.chunk_size, 1000);
    assert_eq!(config.chunking.chunk_overlap, 150);
    assert_eq!(config.retrieval.top_k, 5);
    assert_eq!(config.rentals_file, "bengaluru_rentals.csv");
    assert!(config.validate().is_ok());
}

#[test]
fn config_validation() {
    let config = Config::default();

    let mut invalid_config = config.clone();
    invalid_config.embedding.protocol = "ftp".to_string();
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.embedding.port = 0;
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.embedding.model = String::new();
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.embedding.batch_size = 1001;
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.chat.model = "  ".to_string();
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.search.result_count = 11;
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.retrieval.top_k = 0;
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config;
    invalid_config.chat.timeout_secs = 0;
    assert!(invalid_config.validate().is_err());
}

#[test]
fn overlap_must_be_smaller_than_chunk_size() {
    let mut config = Config::default();
    config.chunking.chunk_size = 100;
    config.chunking.chunk_overlap = 100;

    assert!(matches!(
        config.validate(),
        Err(ConfigError::OverlapTooLarge(100, 100))
    ));

    config.chunking.chunk_overlap = 0;
    assert!(config.validate().is_ok());
}

#[test]
fn embedding_url_generation() {
    let config = Config::default();
    let url = config
        .embedding_url()
        .expect("should generate embedding url successfully");
    assert_eq!(url.as_str(), "http://localhost:11434/");
}

#[test]
fn toml_serialization_skips_secrets() {
    let mut config = Config::default();
    config.secrets.groq_api_key = Some("gsk_secret".to_string());

    let toml_str = toml::to_string(&config).expect("should serialize toml correctly");
    assert!(!toml_str.contains("gsk_secret"));

    let parsed_config: Config = toml::from_str(&toml_str).expect("should parse toml correctly");
    assert_eq!(parsed_config.embedding, config.embedding);
    assert_eq!(parsed_config.chunking, config.chunking);
    assert_eq!(parsed_config.secrets, Secrets::default());
}

#[test]
fn partial_toml_uses_defaults() {
    let parsed: Config = toml::from_str(
        r#"
        data_dir = "docs"

        [retrieval]
        top_k = 8
        "#,
    )
    .expect("should parse partial toml");

    assert_eq!(parsed.data_dir, PathBuf::from("docs"));
    assert_eq!(parsed.retrieval.top_k, 8);
    assert_eq!(parsed.index_dir, PathBuf::from("vector_index"));
    assert_eq!(parsed.chunking, ChunkingConfig::default());
}

#[test]
#[serial]
fn load_missing_config_uses_defaults() {
    clear_secret_vars();
    let temp_dir = TempDir::new().expect("should create temp dir");

    let config = Config::load(temp_dir.path()).expect("missing config should load defaults");

    assert_eq!(config.base_dir, temp_dir.path());
    assert_eq!(config.data_path(), temp_dir.path().join("data"));
    assert_eq!(config.index_path(), temp_dir.path().join("vector_index"));
    assert!(config.secrets.groq_api_key.is_none());
    assert!(!config.secrets.search_configured());
}

#[test]
#[serial]
fn load_reads_config_file() {
    clear_secret_vars();
    let temp_dir = TempDir::new().expect("should create temp dir");
    fs::write(
        temp_dir.path().join(CONFIG_FILE_NAME),
        r#"
[search]
query_prefix = "flats in Pune"

[chunking]
chunk_size = 500
chunk_overlap = 50
"#,
    )
    .expect("should write config file");

    let config = Config::load(temp_dir.path()).expect("should load config file");

    assert_eq!(config.search.query_prefix, "flats in Pune");
    assert_eq!(config.chunking.chunk_size, 500);
    assert_eq!(config.chunking.chunk_overlap, 50);
    assert_eq!(config.chat, ChatConfig::default());
}

#[test]
fn chat_endpoint_without_trailing_slash_is_normalized() {
    let config = ChatConfig {
        endpoint: "https://api.groq.com/openai/v1".to_string(),
        ..ChatConfig::default()
    };

    config.validate().expect("endpoint without slash is valid");
    assert_eq!(
        config.url().expect("should parse").as_str(),
        "https://api.groq.com/openai/v1/"
    );
    assert_eq!(
        ChatConfig::default().url().expect("should parse").as_str(),
        "https://api.groq.com/openai/v1/"
    );
}

#[test]
fn chat_endpoint_must_be_a_base_url() {
    let config = ChatConfig {
        endpoint: "mailto:rent@example.com".to_string(),
        ..ChatConfig::default()
    };

    assert!(matches!(config.validate(), Err(ConfigError::InvalidUrl(_))));
}

#[test]
#[serial]
fn invalid_file_is_rejected() {
    clear_secret_vars();
    let temp_dir = TempDir::new().expect("should create temp dir");
    fs::write(
        temp_dir.path().join(CONFIG_FILE_NAME),
        "[chunking]\nchunk_size = 10\nchunk_overlap = 20\n",
    )
    .expect("should write config");

    assert!(Config::load(temp_dir.path()).is_err());
}

#[test]
#[serial]
fn secrets_come_from_environment() {
    clear_secret_vars();
    // SAFETY: serialized with other environment tests
    unsafe {
        std::env::set_var(GROQ_API_KEY_VAR, "gsk_test");
        std::env::set_var(GOOGLE_API_KEY_VAR, "google-key");
        std::env::set_var(GOOGLE_CSE_ID_VAR, "   ");
    }

    let secrets = Secrets::from_env();
    assert_eq!(secrets.groq_api_key.as_deref(), Some("gsk_test"));
    assert_eq!(secrets.google_api_key.as_deref(), Some("google-key"));
    assert_eq!(secrets.google_cse_id, None, "blank values count as missing");
    assert!(!secrets.search_configured());

    clear_secret_vars();
}

#[test]
fn secrets_debug_hides_values() {
    let secrets = Secrets {
        groq_api_key: Some("gsk_very_secret".to_string()),
        google_api_key: None,
        google_cse_id: Some("cse".to_string()),
    };

    let rendered = format!("{:?}", secrets);
    assert!(!rendered.contains("gsk_very_secret"));
    assert!(rendered.contains("<set>"));
}
