use clap::{Args, Parser, Subcommand};
use rental_assistant::Result;
use rental_assistant::assistant::ResponseMode;
use rental_assistant::commands::{SessionOptions, ask_once, build_index, run_chat};
use rental_assistant::config::{Config, show_config};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rental-assistant")]
#[command(about = "A rental-housing assistant for Bangalore backed by a local knowledge base and web search")]
#[command(version)]
struct Cli {
    /// Directory holding config.toml, the data folder and the persisted index
    #[arg(long, global = true, default_value = ".")]
    base_dir: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SessionArgs {
    /// Verbosity of the assistant's answers
    #[arg(long, value_enum, default_value_t = ResponseMode::Detailed)]
    mode: ResponseMode,
    /// What you look for in a neighbourhood; enables match scores
    #[arg(long)]
    preferences: Option<String>,
}

impl From<SessionArgs> for SessionOptions {
    fn from(args: SessionArgs) -> Self {
        Self {
            mode: args.mode,
            preferences: args.preferences,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat session
    Chat {
        #[command(flatten)]
        session: SessionArgs,
    },
    /// Ask a single question and print the answer
    Ask {
        /// The question to ask
        question: String,
        #[command(flatten)]
        session: SessionArgs,
    },
    /// Load or build the knowledge-base index
    Index {
        /// Rebuild from the data folder even if an index is already persisted
        #[arg(long)]
        rebuild: bool,
    },
    /// Show the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.base_dir)?;

    match cli.command {
        Commands::Chat { session } => {
            run_chat(&config, session.into()).await?;
        }
        Commands::Ask { question, session } => {
            ask_once(&config, &question, session.into()).await?;
        }
        Commands::Index { rebuild } => {
            build_index(&config, rebuild).await?;
        }
        Commands::Config => {
            show_config(&config);
        }
    }

    Ok(())
}
