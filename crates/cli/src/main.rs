//! labassist CLI: the main entry point.
//!
//! Commands:
//! - `chat`     Interactive question/answer loop (default)
//! - `ask`      Answer a single question
//! - `docs`     List indexed documents, or show what a query would select
//! - `tools`    List the diagnostic tools the model may request
//! - `doctor`   Check config, documents and the model server
//! - `onboard`  Write a default config file

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "labassist",
    about = "labassist: ask questions about your home lab, answered from its documentation",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of ~/.labassist/config.toml
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive session
    Chat,

    /// Answer one question and exit
    Ask {
        /// The question
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },

    /// List indexed documents
    Docs {
        /// Show which documents this query would select, and why
        #[arg(short, long)]
        query: Option<String>,
    },

    /// List available diagnostic tools
    Tools,

    /// Diagnose setup problems
    Doctor,

    /// Write a default config file
    Onboard,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so they never interleave with answers
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => commands::chat::run(config_path).await?,
        Commands::Ask { question } => commands::ask::run(config_path, &question.join(" ")).await?,
        Commands::Docs { query } => commands::docs::run(config_path, query.as_deref())?,
        Commands::Tools => commands::tools::run(config_path)?,
        Commands::Doctor => commands::doctor::run(config_path).await?,
        Commands::Onboard => commands::onboard::run(config_path)?,
    }

    Ok(())
}
