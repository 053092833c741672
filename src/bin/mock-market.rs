// Mock Market - practice making and taking prices against a quoting bot

use clap::{Parser, Subcommand};
use mock_market::{Difficulty, MarketError};
use tracing::{error, Level};

// Load command modules from cli directory
#[path = "../cli/session_commands.rs"]
mod session_commands;

#[derive(Parser)]
#[command(name = "mock-market")]
#[command(version = "0.1.0")]
#[command(about = "Trade against a quoting bot and see how you settle", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "mock-market.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Play an interactive session on the console
    Play {
        /// easy, medium or hard
        #[arg(short, long)]
        difficulty: Option<Difficulty>,

        /// Number of ticks
        #[arg(short, long)]
        ticks: Option<usize>,

        /// RNG seed for a reproducible session
        #[arg(short, long)]
        seed: Option<u64>,

        /// Print the final report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Let the bot quote with nobody trading
    Watch {
        /// Number of ticks
        #[arg(short, long)]
        ticks: Option<usize>,

        /// RNG seed for a reproducible session
        #[arg(short, long)]
        seed: Option<u64>,

        /// Print the final report as JSON
        #[arg(long)]
        json: bool,

        /// Only print the board, not every quote
        #[arg(short, long)]
        quiet: bool,
    },

    /// Show the effective configuration
    Config,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so they don't tear up the board
    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Init { force } => session_commands::init(&cli.config, force),
        Commands::Config => session_commands::show_config(&cli.config),
        Commands::Play { difficulty, ticks, seed, json } => {
            session_commands::play(&cli.config, difficulty, ticks, seed, json).await
        }
        Commands::Watch { ticks, seed, json, quiet } => {
            session_commands::watch(&cli.config, ticks, seed, json, quiet).await
        }
    };

    if let Err(e) = result {
        error!("❌ {} error", e.category());
        if let MarketError::Config(_) = e {
            error!("💡 Run: mock-market init, or fix {}", cli.config);
        }
        return Err(e.into());
    }

    Ok(())
}
