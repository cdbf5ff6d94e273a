//! ReelBot CLI, the main entry point.
//!
//! Commands:
//! - `ask`     One question, or an interactive session
//! - `serve`   Start the HTTP chat gateway
//! - `doctor`  Check config and backend reachability
//! - `config`  Print, locate, or validate configuration

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "reelbot",
    about = "ReelBot: ask for a movie or episode, get a streaming link",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask for a streaming link
    Ask {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Start the HTTP chat gateway
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Diagnose configuration and connectivity
    Doctor,

    /// Configuration helpers
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the default configuration as TOML
    Default,
    /// Print the effective configuration with secrets redacted
    Show,
    /// Print the config file location
    Path,
    /// Load and validate the configuration
    Validate,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Ask { message } => commands::ask::run(message).await?,
        Commands::Serve { port } => commands::serve::run(port).await?,
        Commands::Doctor => commands::doctor::run().await?,
        Commands::Config { action } => match action.unwrap_or(ConfigAction::Default) {
            ConfigAction::Default => commands::config_cmd::default().await?,
            ConfigAction::Show => commands::config_cmd::show().await?,
            ConfigAction::Path => commands::config_cmd::path().await?,
            ConfigAction::Validate => commands::config_cmd::validate().await?,
        },
    }

    Ok(())
}
