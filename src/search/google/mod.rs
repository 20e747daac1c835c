
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::{SearchError, SearchHit, WebSearch};
use crate::config::SearchConfig;
use crate::http::{build_agent, read_body};

const SERVICE_NAME: &str = "Google Custom Search";

/// Client for the Google Custom Search JSON API
#[derive(Debug, Clone)]
pub struct GoogleSearchClient {
    endpoint: Url,
    credentials: Option<Credentials>,
    agent: ureq::Agent,
}

#[derive(Clone)]
struct Credentials {
    api_key: String,
    engine_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credentials { .. }")
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    title: Option<String>,
    link: Option<String>,
    snippet: Option<String>,
}

impl GoogleSearchClient {
    /// Build a client. Missing credentials are allowed and reported on each search.
    #[inline]
    pub fn new(
        config: &SearchConfig,
        api_key: Option<&str>,
        engine_id: Option<&str>,
    ) -> Result<Self, SearchError> {
        let endpoint = config
            .url()
            .map_err(|e| SearchError::Request(e.to_string()))?;

        let credentials = match (api_key, engine_id) {
            (Some(api_key), Some(engine_id))
                if !api_key.trim().is_empty() && !engine_id.trim().is_empty() =>
            {
                Some(Credentials {
                    api_key: api_key.to_string(),
                    engine_id: engine_id.to_string(),
                })
            }
            _ => None,
        };

        Ok(Self {
            endpoint,
            credentials,
            agent: build_agent(Duration::from_secs(config.timeout_secs)),
        })
    }

    #[inline]
    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    fn request_url(&self, credentials: &Credentials, query: &str, count: u32) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("key", &credentials.api_key)
            .append_pair("cx", &credentials.engine_id)
            .append_pair("q", query)
            .append_pair("num", &count.clamp(1, 10).to_string());
        url
    }
}

impl WebSearch for GoogleSearchClient {
    #[inline]
    fn search(&self, query: &str, count: u32) -> Result<Vec<SearchHit>, SearchError> {
        let credentials = self.credentials.as_ref().ok_or(SearchError::NotConfigured)?;

        let url = self.request_url(credentials, query, count);
        debug!("Searching the web for '{}' ({} results)", query, count);

        let body = read_body(
            self.agent
                .get(url.as_str())
                .call()
                .and_then(|mut resp| resp.body_mut().read_to_string()),
            SERVICE_NAME,
            self.endpoint.as_str(),
        )
        .map_err(|e| SearchError::Request(format!("{:#}", e)))?;

        let response: SearchResponse =
            serde_json::from_str(&body).map_err(|e| SearchError::Parse(e.to_string()))?;

        Ok(response
            .items
            .into_iter()
            .map(|item| SearchHit {
                title: item.title.unwrap_or_else(|| "No Title".to_string()),
                link: item.link.unwrap_or_else(|| "#".to_string()),
                snippet: item.snippet.unwrap_or_else(|| "No Snippet".to_string()),
            })
            .collect())
    }
}
