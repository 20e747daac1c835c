// Document loading
// Reads free-text files recursively plus one designated tabular file


use anyhow::{Context, Result};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Columns every rentals table is expected to carry
pub const EXPECTED_COLUMNS: &[&str] = &["area", "rent", "bhk"];

const TEXT_EXTENSION: &str = "txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    FreeText,
    TabularRecord,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FreeText => f.write_str("free_text"),
            Self::TabularRecord => f.write_str("tabular_record"),
        }
    }
}

impl DocumentKind {
    #[inline]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "free_text" => Some(Self::FreeText),
            "tabular_record" => Some(Self::TabularRecord),
            _ => None,
        }
    }
}

/// A loaded text unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// File path the text came from
    pub source: String,
    /// Row number within the tabular file, for tabular records
    pub row: Option<usize>,
    pub kind: DocumentKind,
    pub text: String,
}

/// Load every `.txt` file under `folder` and every row of `rentals_file` if it exists.
///
/// A missing folder yields an empty list; the caller decides whether that is fatal.
#[inline]
pub fn load_documents(folder: &Path, rentals_file: &str) -> Result<Vec<Document>> {
    if !folder.is_dir() {
        warn!("Data folder '{}' not found", folder.display());
        return Ok(Vec::new());
    }

    let mut documents = load_text_documents(folder)?;
    let text_count = documents.len();

    let table_path = folder.join(rentals_file);
    if table_path.is_file() {
        documents.extend(load_tabular_documents(&table_path)?);
    } else {
        debug!("No rentals table at {}", table_path.display());
    }

    info!(
        "Loaded {} documents from {} ({} text files, {} table rows)",
        documents.len(),
        folder.display(),
        text_count,
        documents.len() - text_count
    );
    Ok(documents)
}

/// Recursively load free-text files, in a stable path order
#[inline]
pub fn load_text_documents(folder: &Path) -> Result<Vec<Document>> {
    let mut documents = Vec::new();

    for entry in WalkDir::new(folder).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", folder.display()))?;
        let path = entry.path();

        let is_text = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(TEXT_EXTENSION));
        if !entry.file_type().is_file() || !is_text {
            continue;
        }

        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read text file: {}", path.display()))?;
        debug!("Loaded {} ({} bytes)", path.display(), text.len());

        documents.push(Document {
            source: path.display().to_string(),
            row: None,
            kind: DocumentKind::FreeText,
            text,
        });
    }

    Ok(documents)
}

/// Load a CSV file with one document per row, rendered as `column: value` lines
#[inline]
pub fn load_tabular_documents(path: &Path) -> Result<Vec<Document>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read CSV headers: {}", path.display()))?
        .clone();

    let missing: Vec<&str> = EXPECTED_COLUMNS
        .iter()
        .copied()
        .filter(|expected| {
            !headers
                .iter()
                .any(|h| h.trim().eq_ignore_ascii_case(expected))
        })
        .collect();
    if !missing.is_empty() {
        warn!(
            "Rentals table {} is missing expected columns: {:?}",
            path.display(),
            missing
        );
    }

    let source = path.display().to_string();
    let mut documents = Vec::new();

    for (row, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Failed to read CSV row {}", row + 1))?;

        let text = headers
            .iter()
            .zip(record.iter())
            .map(|(column, value)| format!("{}: {}", column.trim(), value.trim()))
            .join("\n");

        documents.push(Document {
            source: source.clone(),
            row: Some(row),
            kind: DocumentKind::TabularRecord,
            text,
        });
    }

    debug!("Loaded {} rows from {}", documents.len(), path.display());
    Ok(documents)
}
