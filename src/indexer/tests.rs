use super::*;
use crate::test_support::{FailingEmbedder, LetterEmbedder, letter_histogram};
use std::fs;
use std::sync::atomic::Ordering;
use tempfile::TempDir;

fn create_test_config() -> (Config, TempDir) {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config = Config {
        base_dir: temp_dir.path().to_path_buf(),
        ..Config::default()
    };
    (config, temp_dir)
}

fn write_documents(config: &Config) {
    let data = config.data_path();
    fs::create_dir_all(&data).expect("should create data dir");
    fs::write(
        data.join("koramangala.txt"),
        "Koramangala is a lively area full of startups, cafes and pubs.",
    )
    .expect("should write text document");
    fs::write(
        data.join("bengaluru_rentals.csv"),
        "area,rent,bhk\nHSR Layout,28000,2\nWhitefield,22000,1\n",
    )
    .expect("should write rentals table");
}

#[test]
fn build_indexes_text_files_and_table_rows() {
    let (config, _temp_dir) = create_test_config();
    write_documents(&config);
    let indexer = Indexer::new(&config, Arc::new(LetterEmbedder::default()));

    let (index, stats) = indexer.build().expect("build should succeed");

    assert_eq!(stats.documents_loaded, 3);
    assert_eq!(stats.chunks_created, 3);
    assert_eq!(index.len(), 3);
    assert!(
        index
            .entries()
            .iter()
            .any(|e| e.chunk.content.contains("area: HSR Layout"))
    );
}

#[test]
fn build_without_data_folder_reports_no_documents() {
    let (config, _temp_dir) = create_test_config();
    let indexer = Indexer::new(&config, Arc::new(LetterEmbedder::default()));

    assert!(matches!(
        indexer.build(),
        Err(AssistantError::NoDocuments(_))
    ));
}

#[tokio::test]
async fn load_or_build_persists_then_reuses() {
    let (config, _temp_dir) = create_test_config();
    write_documents(&config);
    let embedder = Arc::new(LetterEmbedder::default());
    let indexer = Indexer::new(&config, embedder.clone());

    let built = indexer
        .load_or_build()
        .await
        .expect("load_or_build should succeed")
        .expect("index should be built");
    assert!(indexer.store().exists().await.expect("exists should succeed"));
    let calls_after_build = embedder.calls.load(Ordering::SeqCst);

    let loaded = indexer
        .load_or_build()
        .await
        .expect("load_or_build should succeed")
        .expect("index should be loaded");

    assert_eq!(
        embedder.calls.load(Ordering::SeqCst),
        calls_after_build,
        "a persisted index is loaded, not rebuilt"
    );
    let query = letter_histogram("startup cafes");
    assert_eq!(
        built.search(&query, 2).expect("search should succeed"),
        loaded.search(&query, 2).expect("search should succeed")
    );
}

#[tokio::test]
async fn load_or_build_degrades_without_documents() {
    let (config, _temp_dir) = create_test_config();
    let indexer = Indexer::new(&config, Arc::new(LetterEmbedder::default()));

    let result = indexer
        .load_or_build()
        .await
        .expect("missing documents should not be an error");
    assert!(result.is_none());
    assert!(!indexer.store().exists().await.expect("exists should succeed"));
}

#[tokio::test]
async fn load_or_build_degrades_on_embedding_failure() {
    let (config, _temp_dir) = create_test_config();
    write_documents(&config);
    let indexer = Indexer::new(&config, Arc::new(FailingEmbedder));

    let result = indexer
        .load_or_build()
        .await
        .expect("embedding failure should not be an error");
    assert!(result.is_none());
}

#[tokio::test]
async fn rebuild_picks_up_changed_documents() {
    let (config, _temp_dir) = create_test_config();
    write_documents(&config);
    let indexer = Indexer::new(&config, Arc::new(LetterEmbedder::default()));
    indexer
        .load_or_build()
        .await
        .expect("load_or_build should succeed");

    fs::write(
        config.data_path().join("jayanagar.txt"),
        "Jayanagar is green and quiet.",
    )
    .expect("should write new document");

    let stale = indexer
        .load_or_build()
        .await
        .expect("load_or_build should succeed")
        .expect("index should be loaded");
    assert_eq!(stale.len(), 3, "existing index is not rebuilt implicitly");

    let (rebuilt, stats) = indexer.rebuild().await.expect("rebuild should succeed");
    assert_eq!(stats.documents_loaded, 4);
    assert_eq!(rebuilt.len(), 4);

    let reloaded = indexer
        .store()
        .load()
        .await
        .expect("load should succeed")
        .expect("index should be present");
    assert_eq!(reloaded, rebuilt);
}

#[tokio::test]
async fn rebuild_without_documents_fails() {
    let (config, _temp_dir) = create_test_config();
    let indexer = Indexer::new(&config, Arc::new(LetterEmbedder::default()));

    assert!(matches!(
        indexer.rebuild().await,
        Err(AssistantError::NoDocuments(_))
    ));
}
