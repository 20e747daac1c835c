#[cfg(test)]
mod tests;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::{ChatMessage, ChatModel};
use crate::config::ChatConfig;
use crate::http::{build_agent, read_body};

const SERVICE_NAME: &str = "Groq";

/// Client for an OpenAI-compatible `chat/completions` endpoint
#[derive(Clone)]
pub struct GroqClient {
    completions_url: Url,
    model: String,
    api_key: String,
    agent: ureq::Agent,
}

impl std::fmt::Debug for GroqClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroqClient")
            .field("completions_url", &self.completions_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

impl GroqClient {
    /// Create a client; a missing API key is an initialization failure
    #[inline]
    pub fn new(config: &ChatConfig, api_key: Option<&str>) -> Result<Self> {
        let api_key = api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| anyhow!("GROQ_API_KEY not found. Make sure it is set in the environment"))?;

        let completions_url = config
            .url()
            .context("Invalid chat endpoint")?
            .join("chat/completions")
            .context("Failed to build completions URL")?;

        Ok(Self {
            completions_url,
            model: config.model.clone(),
            api_key: api_key.to_string(),
            agent: build_agent(Duration::from_secs(config.timeout_secs)),
        })
    }
}

impl ChatModel for GroqClient {
    #[inline]
    fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        debug!(
            "Requesting completion from {} for {} messages",
            self.model,
            messages.len()
        );

        let request = CompletionRequest {
            model: &self.model,
            messages,
        };
        let request_json =
            serde_json::to_string(&request).context("Failed to serialize completion request")?;

        let response_text = read_body(
            self.agent
                .post(self.completions_url.as_str())
                .header("Content-Type", "application/json")
                .header("Authorization", format!("Bearer {}", self.api_key))
                .send(&request_json)
                .and_then(|mut resp| resp.body_mut().read_to_string()),
            SERVICE_NAME,
            self.completions_url.as_str(),
        )
        .context("Chat completion request failed")?;

        let response: CompletionResponse = serde_json::from_str(&response_text)
            .context("Failed to parse completion response")?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| anyhow!("Completion response contained no message"))?;

        debug!("Received completion of {} characters", content.len());
        Ok(content)
    }
}
