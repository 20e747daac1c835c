
use anyhow::{Context, Result};
use clap::ValueEnum;
use console::style;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::assistant::{Assistant, AssistantSettings, GREETING, ResponseMode, is_shortlist_command};
use crate::config::Config;
use crate::embeddings::OllamaClient;
use crate::indexer::Indexer;
use crate::resources::Resources;

/// Verbosity and preferences a session starts with
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionOptions {
    pub mode: ResponseMode,
    pub preferences: Option<String>,
}

/// A line typed in the chat loop, classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatInput {
    Empty,
    Quit,
    Clear,
    Preferences(String),
    Mode(ResponseMode),
    InvalidMode(String),
    Message(String),
}

/// Classify a chat line. `/shortlist` is an ordinary message handled by the assistant.
#[inline]
pub fn parse_chat_input(line: &str) -> ChatInput {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ChatInput::Empty;
    }

    let (command, argument) = trimmed
        .split_once(char::is_whitespace)
        .map_or((trimmed, ""), |(command, rest)| (command, rest.trim()));

    match command.to_lowercase().as_str() {
        "/quit" | "/exit" => ChatInput::Quit,
        "/clear" => ChatInput::Clear,
        "/prefs" => ChatInput::Preferences(argument.to_string()),
        "/mode" => ResponseMode::from_str(argument, true)
            .map_or_else(|_| ChatInput::InvalidMode(argument.to_string()), ChatInput::Mode),
        _ => ChatInput::Message(line.to_string()),
    }
}

fn spinner(message: &'static str) -> ProgressBar {
    let bar = if console::user_attended_stderr() {
        ProgressBar::new_spinner().with_style(
            ProgressStyle::with_template("{spinner} {msg}").expect("style template is valid"),
        )
    } else {
        ProgressBar::hidden()
    };
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

async fn load_resources(config: &Config) -> Result<Resources> {
    let bar = spinner("Loading models and knowledge base...");
    let resources = Resources::initialize(config).await;
    bar.finish_and_clear();

    let resources = resources.context("Could not initialize the assistant")?;
    if resources.knowledge_base().is_none() {
        eprintln!(
            "{}",
            style("⚠ No local knowledge base; answers will rely on web search.").yellow()
        );
    }
    Ok(resources)
}

fn new_assistant<'r>(
    resources: &'r Resources,
    config: &Config,
    options: SessionOptions,
) -> Assistant<'r> {
    let mut assistant = Assistant::new(resources, AssistantSettings::from_config(config));
    assistant.set_response_mode(options.mode);
    if let Some(preferences) = options.preferences {
        assistant.set_preferences(preferences);
    }
    assistant
}

fn print_reply(reply: &str) {
    println!("{} {}", style("Assistant:").bold().green(), reply);
    println!();
}

fn run_turn(assistant: &mut Assistant<'_>, text: &str) {
    let bar = if is_shortlist_command(text) {
        spinner("Analyzing your conversation to create a shortlist...")
    } else {
        spinner("Searching for the perfect place...")
    };
    let reply = assistant.handle_turn(text).content.clone();
    bar.finish_and_clear();
    print_reply(&reply);
}

/// Interactive chat until `/quit`
#[inline]
pub async fn run_chat(config: &Config, options: SessionOptions) -> Result<()> {
    let resources = load_resources(config).await?;
    let mut assistant = new_assistant(&resources, config, options);

    eprintln!("{}", style("🏡 AI Rental Search Assistant").bold().cyan());
    eprintln!(
        "{}",
        style("Commands: /shortlist, /prefs <text>, /mode detailed|concise, /clear, /quit").dim()
    );
    eprintln!();
    print_reply(GREETING);

    loop {
        let line: String = Input::new()
            .with_prompt("You")
            .allow_empty(true)
            .interact_text()?;

        match parse_chat_input(&line) {
            ChatInput::Empty => {}
            ChatInput::Quit => break,
            ChatInput::Clear => {
                assistant.clear_history();
                eprintln!("{}", style("✓ Chat history cleared").green());
                print_reply(GREETING);
            }
            ChatInput::Preferences(text) => {
                if text.is_empty() {
                    eprintln!("{}", style("✓ Preferences cleared").green());
                } else {
                    eprintln!(
                        "{}",
                        style("✓ Preferences saved. Ask about an area to get a match score.")
                            .green()
                    );
                }
                assistant.set_preferences(text);
            }
            ChatInput::Mode(mode) => {
                assistant.set_response_mode(mode);
                eprintln!("{} {}", style("✓ Response mode:").green(), mode);
            }
            ChatInput::InvalidMode(value) => {
                eprintln!(
                    "{} '{}' (expected detailed or concise)",
                    style("Unknown response mode").red(),
                    value
                );
            }
            ChatInput::Message(text) => run_turn(&mut assistant, &text),
        }
    }

    info!(
        "Chat ended after {} messages",
        assistant.conversation().len()
    );
    Ok(())
}

/// Answer a single question and exit
#[inline]
pub async fn ask_once(config: &Config, question: &str, options: SessionOptions) -> Result<()> {
    let resources = load_resources(config).await?;
    let mut assistant = new_assistant(&resources, config, options);
    run_turn(&mut assistant, question);
    Ok(())
}

/// Load or build the index; `rebuild` discards whatever is persisted
#[inline]
pub async fn build_index(config: &Config, rebuild: bool) -> Result<()> {
    let embedder = OllamaClient::new(&config.embedding)?;
    embedder
        .health_check()
        .context("Embedding server is not available")?;
    let indexer = Indexer::new(config, Arc::new(embedder));

    if rebuild {
        let bar = spinner("Rebuilding index...");
        let result = indexer.rebuild().await;
        bar.finish_and_clear();

        let (index, stats) = result.context("Failed to rebuild index")?;
        eprintln!(
            "{} {} documents, {} chunks, {} dimensions",
            style("✓ Index rebuilt:").green(),
            stats.documents_loaded,
            stats.chunks_created,
            index.dimension()
        );
    } else {
        let bar = spinner("Loading index...");
        let result = indexer.load_or_build().await;
        bar.finish_and_clear();

        match result.context("Failed to load index")? {
            Some(index) => eprintln!(
                "{} {} chunks ({})",
                style("✓ Index ready:").green(),
                index.len(),
                index.model()
            ),
            None => {
                warn!("No index could be built from {}", config.data_path().display());
                eprintln!(
                    "{} no documents found in {}",
                    style("⚠ Index not built:").yellow(),
                    style(config.data_path().display()).cyan()
                );
            }
        }
    }

    eprintln!(
        "Index location: {}",
        style(indexer.store().path().display()).dim()
    );
    Ok(())
}
