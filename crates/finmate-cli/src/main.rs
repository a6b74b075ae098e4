//! finmate command-line interface
//!
//! Commands:
//! - `chat`      - interactive chat about the portfolio
//! - `ask`       - one question, JSON reply envelope on stdout
//! - `analyze`   - score a news file against the portfolio
//! - `portfolio` - list, add or remove tickers

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod portfolio;

#[derive(Parser, Debug)]
#[command(name = "finmate", about = "Portfolio news intelligence assistant", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Portfolio file ({"tickers": [...]})
    #[arg(long, global = true, default_value = "portfolio.json")]
    portfolio: PathBuf,

    /// Print tool activity and info-level logs
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Extra context for chat runs
#[derive(Args, Debug, Clone, Default)]
pub struct ContextArgs {
    /// Analyzed news JSON, as written by `analyze --json`
    #[arg(long)]
    pub news: Option<PathBuf>,

    /// Plain text document excerpt
    #[arg(long)]
    pub document: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Chat interactively
    Chat {
        #[command(flatten)]
        context: ContextArgs,
    },

    /// Ask a single question
    Ask {
        query: String,

        #[command(flatten)]
        context: ContextArgs,
    },

    /// Score raw news items against the portfolio
    Analyze {
        /// JSON array of news items
        #[arg(long)]
        news: PathBuf,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Manage the portfolio file
    Portfolio {
        #[command(subcommand)]
        action: commands::portfolio::PortfolioAction,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    finmate_utils::init_tracing_with_default(if cli.verbose { "info" } else { "warn" });

    match cli.command {
        Commands::Chat { context } => {
            commands::chat::run_repl(&cli.portfolio, &context, cli.verbose).await
        }
        Commands::Ask { query, context } => {
            commands::chat::run_ask(&cli.portfolio, &context, query, cli.verbose).await
        }
        Commands::Analyze { news, json } => {
            commands::analyze::run(&cli.portfolio, &news, json).await
        }
        Commands::Portfolio { action } => commands::portfolio::run(&cli.portfolio, action),
    }
}
