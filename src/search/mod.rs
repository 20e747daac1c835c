// Web search module
// Query -> snippets seam plus formatting of results into prompt context


pub mod google;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub use google::GoogleSearchClient;

/// Separator between context blocks handed to the language model
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

pub const NOT_CONFIGURED_MESSAGE: &str =
    "Web search is not configured. Missing Google API Key or CSE ID.";
pub const NO_RESULTS_MESSAGE: &str = "No relevant search results found from the web.";
pub const SEARCH_FAILED_MESSAGE: &str = "Sorry, I couldn't perform a web search at the moment.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("web search is not configured")]
    NotConfigured,
    #[error("web search request failed: {0}")]
    Request(String),
    #[error("could not parse web search response: {0}")]
    Parse(String),
}

/// External search API returning ranked snippets
pub trait WebSearch: Send + Sync {
    fn search(&self, query: &str, count: u32) -> Result<Vec<SearchHit>, SearchError>;
}

/// Run a search and render the hits as prompt context.
///
/// Never fails: a missing configuration, a transport error or an empty result set
/// each turn into a descriptive placeholder string.
#[inline]
pub fn search_context(search: &dyn WebSearch, query: &str, count: u32) -> String {
    match search.search(query, count) {
        Ok(hits) if hits.is_empty() => NO_RESULTS_MESSAGE.to_string(),
        Ok(hits) => {
            debug!("Web search returned {} results", hits.len());
            format_hits(&hits)
        }
        Err(SearchError::NotConfigured) => {
            debug!("Web search skipped: not configured");
            NOT_CONFIGURED_MESSAGE.to_string()
        }
        Err(e) => {
            warn!("Error during web search: {}", e);
            SEARCH_FAILED_MESSAGE.to_string()
        }
    }
}

/// `Title / Snippet / Link` blocks joined by [`CONTEXT_SEPARATOR`]
#[inline]
pub fn format_hits(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|hit| {
            format!(
                "Title: {}\nSnippet: {}\nLink: {}",
                hit.title,
                hit.snippet.split_whitespace().join(" "),
                hit.link
            )
        })
        .join(CONTEXT_SEPARATOR)
}
