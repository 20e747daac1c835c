//! Context fusion and dialogue management.
//!
//! An [`Assistant`] owns one [`Conversation`] and processes one turn at a time.
//! A standard turn gathers knowledge-base and web-search context in parallel,
//! fuses both with the full history into a single prompt and records the reply.
//! The `/shortlist` command instead summarizes the conversation so far without
//! touching either context source.


mod areas;
mod conversation;
mod prompts;

use anyhow::Context;
use clap::ValueEnum;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::llm::ChatMessage;
use crate::resources::Resources;
use crate::retrieval::retrieve;
use crate::search::{CONTEXT_SEPARATOR, SEARCH_FAILED_MESSAGE, search_context};

pub use areas::{AREAS, Area, find_area};
pub use conversation::{Conversation, GREETING};

pub const SHORTLIST_COMMAND: &str = "/shortlist";

const GENERATION_FAILED_PREFIX: &str = "Sorry, I encountered an error: ";
const SHORTLIST_FAILED_PREFIX: &str =
    "Sorry, I encountered an error while creating your shortlist: ";
const MATCH_SCORE_FAILED_PREFIX: &str = "Could not calculate match score due to an error: ";

/// Verbosity directive placed in the fusion prompt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ResponseMode {
    #[default]
    Detailed,
    Concise,
}

impl fmt::Display for ResponseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Detailed => f.write_str("Detailed"),
            Self::Concise => f.write_str("Concise"),
        }
    }
}

/// Free-text description of what the user wants in a neighbourhood; last write wins
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPreferences(String);

impl UserPreferences {
    #[inline]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Whitespace-only preferences count as unset
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Per-turn knobs taken from the configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantSettings {
    pub top_k: usize,
    pub search_prefix: String,
    pub search_count: u32,
    /// Folder holding the per-area description files
    pub areas_dir: PathBuf,
}

impl AssistantSettings {
    #[inline]
    pub fn from_config(config: &Config) -> Self {
        Self {
            top_k: config.retrieval.top_k,
            search_prefix: config.search.query_prefix.clone(),
            search_count: config.search.result_count,
            areas_dir: config.areas_path(),
        }
    }

    /// Web query for a user message, scoped by the configured prefix
    #[inline]
    pub fn search_query(&self, input: &str) -> String {
        let prefix = self.search_prefix.trim();
        if prefix.is_empty() {
            input.to_string()
        } else {
            format!("{} {}", prefix, input)
        }
    }
}

/// Whether `input` is the shortlist command (trimmed, any case)
#[inline]
pub fn is_shortlist_command(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case(SHORTLIST_COMMAND)
}

/// Dialogue manager for one conversation over shared [`Resources`]
#[derive(Debug)]
pub struct Assistant<'r> {
    resources: &'r Resources,
    settings: AssistantSettings,
    conversation: Conversation,
    preferences: UserPreferences,
    mode: ResponseMode,
}

impl<'r> Assistant<'r> {
    #[inline]
    pub fn new(resources: &'r Resources, settings: AssistantSettings) -> Self {
        Self {
            resources,
            settings,
            conversation: Conversation::new(),
            preferences: UserPreferences::default(),
            mode: ResponseMode::default(),
        }
    }

    #[inline]
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    #[inline]
    pub fn preferences(&self) -> &UserPreferences {
        &self.preferences
    }

    #[inline]
    pub fn set_preferences(&mut self, text: impl Into<String>) {
        self.preferences = UserPreferences::new(text);
    }

    #[inline]
    pub fn response_mode(&self) -> ResponseMode {
        self.mode
    }

    #[inline]
    pub fn set_response_mode(&mut self, mode: ResponseMode) {
        self.mode = mode;
    }

    /// Replace the history with the greeting alone
    #[inline]
    pub fn clear_history(&mut self) {
        info!("Clearing conversation history");
        self.conversation.reset();
    }

    /// Process one user message and return the assistant reply that was recorded.
    ///
    /// Never fails: generation errors become apology text, and the user message and
    /// the reply are both appended either way.
    #[inline]
    pub fn handle_turn(&mut self, input: &str) -> &ChatMessage {
        self.conversation.push(ChatMessage::user(input));

        let reply = if is_shortlist_command(input) {
            self.shortlist()
        } else {
            self.answer(input)
        };

        self.conversation.push(ChatMessage::assistant(reply))
    }

    fn shortlist(&self) -> String {
        debug!(
            "Building shortlist from {} messages",
            self.conversation.len()
        );
        let prompt = prompts::shortlist_prompt(&self.conversation.transcript());

        match self
            .resources
            .chat_model()
            .complete(&[ChatMessage::user(prompt)])
        {
            Ok(summary) => summary,
            Err(e) => {
                error!("Shortlist generation failed: {:#}", e);
                format!("{}{:#}", SHORTLIST_FAILED_PREFIX, e)
            }
        }
    }

    fn answer(&self, input: &str) -> String {
        let (knowledge_base, web_search) = self.gather_context(input);
        let system = prompts::fusion_prompt(self.mode, &knowledge_base, &web_search);

        let mut messages = Vec::with_capacity(self.conversation.len() + 1);
        messages.push(ChatMessage::system(system));
        messages.extend_from_slice(self.conversation.messages());

        let mut reply = match self.resources.chat_model().complete(&messages) {
            Ok(reply) => reply,
            Err(e) => {
                error!("Generation failed: {:#}", e);
                return format!("{}{:#}", GENERATION_FAILED_PREFIX, e);
            }
        };

        if let Some(score) = self.match_score(input) {
            reply.push_str(CONTEXT_SEPARATOR);
            reply.push_str(&score);
        }
        reply
    }

    /// Knowledge-base and web context for `input`, fetched concurrently
    fn gather_context(&self, input: &str) -> (String, String) {
        let resources = self.resources;
        let settings = &self.settings;
        let query = settings.search_query(input);

        std::thread::scope(|scope| {
            let web = scope.spawn(|| {
                search_context(resources.web_search(), &query, settings.search_count)
            });
            let knowledge_base = retrieve(
                resources.knowledge_base(),
                resources.embedder(),
                input,
                settings.top_k,
            );
            let web = web.join().unwrap_or_else(|_| {
                error!("Web search worker panicked");
                SEARCH_FAILED_MESSAGE.to_string()
            });
            (knowledge_base, web)
        })
    }

    /// Score block for the first known area in `input`, if preferences are set
    fn match_score(&self, input: &str) -> Option<String> {
        if self.preferences.is_empty() {
            return None;
        }
        let area = find_area(input)?;
        info!("Calculating match score for {}", area.display_name);

        Some(self.score_area(area).unwrap_or_else(|e| {
            warn!("Match score for {} failed: {:#}", area.display_name, e);
            format!("{}{:#}", MATCH_SCORE_FAILED_PREFIX, e)
        }))
    }

    fn score_area(&self, area: &Area) -> anyhow::Result<String> {
        let path = area.description_path(&self.settings.areas_dir);
        let description = std::fs::read_to_string(&path).with_context(|| {
            format!(
                "no description for {} at {}",
                area.display_name,
                path.display()
            )
        })?;

        let prompt =
            prompts::match_score_prompt(self.preferences.as_str(), area.display_name, &description);
        self.resources
            .chat_model()
            .complete(&[ChatMessage::user(prompt)])
    }
}
