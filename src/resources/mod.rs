// Resources module
// Expensive handles created once at startup and shared read-only by every conversation


use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::embeddings::{EmbeddingProvider, OllamaClient};
use crate::index::VectorIndex;
use crate::indexer::Indexer;
use crate::llm::{ChatModel, GroqClient};
use crate::search::{GoogleSearchClient, WebSearch};
use crate::{AssistantError, Result};

/// Providers plus the knowledge base, if one could be loaded or built
#[derive(Clone)]
pub struct Resources {
    embedder: Arc<dyn EmbeddingProvider>,
    chat_model: Arc<dyn ChatModel>,
    web_search: Arc<dyn WebSearch>,
    knowledge_base: Option<Arc<VectorIndex>>,
}

impl std::fmt::Debug for Resources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resources")
            .field("embedding_model", &self.embedder.model_name())
            .field(
                "knowledge_base_chunks",
                &self.knowledge_base.as_ref().map(|kb| kb.len()),
            )
            .finish_non_exhaustive()
    }
}

impl Resources {
    #[inline]
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        chat_model: Arc<dyn ChatModel>,
        web_search: Arc<dyn WebSearch>,
        knowledge_base: Option<VectorIndex>,
    ) -> Self {
        Self {
            embedder,
            chat_model,
            web_search,
            knowledge_base: knowledge_base.map(Arc::new),
        }
    }

    /// Connect to every provider and load (or build) the knowledge base.
    ///
    /// A missing language-model key or an unreachable embedding server is a
    /// [`AssistantError::ResourceLoad`]; a missing knowledge base is not.
    #[inline]
    pub async fn initialize(config: &Config) -> Result<Self> {
        let chat_model = GroqClient::new(&config.chat, config.secrets.groq_api_key.as_deref())
            .map_err(|e| AssistantError::ResourceLoad(format!("language model: {:#}", e)))?;

        let embedder = OllamaClient::new(&config.embedding)
            .map_err(|e| AssistantError::ResourceLoad(format!("embedding model: {:#}", e)))?;
        embedder
            .health_check()
            .map_err(|e| AssistantError::ResourceLoad(format!("embedding model: {:#}", e)))?;
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(embedder);

        let web_search = GoogleSearchClient::new(
            &config.search,
            config.secrets.google_api_key.as_deref(),
            config.secrets.google_cse_id.as_deref(),
        )
        .map_err(|e| AssistantError::ResourceLoad(format!("web search: {}", e)))?;
        if !web_search.is_configured() {
            info!("Web search is not configured; answers will use the knowledge base only");
        }

        let knowledge_base = Indexer::new(config, Arc::clone(&embedder))
            .load_or_build()
            .await?;

        Ok(Self::new(
            embedder,
            Arc::new(chat_model),
            Arc::new(web_search),
            knowledge_base,
        ))
    }

    #[inline]
    pub fn embedder(&self) -> &dyn EmbeddingProvider {
        self.embedder.as_ref()
    }

    #[inline]
    pub fn chat_model(&self) -> &dyn ChatModel {
        self.chat_model.as_ref()
    }

    #[inline]
    pub fn web_search(&self) -> &dyn WebSearch {
        self.web_search.as_ref()
    }

    #[inline]
    pub fn knowledge_base(&self) -> Option<&VectorIndex> {
        self.knowledge_base.as_deref()
    }
}
