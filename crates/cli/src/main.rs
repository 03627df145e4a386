//! Toolstream CLI — the main entry point.
//!
//! Commands:
//! - `chat`         — Interactive chat or single-message mode
//! - `capabilities` — List the registered capability providers
//! - `doctor`       — Diagnose config and backend reachability

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "toolstream",
    about = "Toolstream — streaming chat with tool-call execution",
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
    /// Chat with the model
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Override the configured domain tag
        #[arg(long)]
        domain: Option<String>,

        /// Override the configured mode tag
        #[arg(long)]
        mode: Option<String>,

        /// Attach an image path to the request
        #[arg(long)]
        image: Option<String>,
    },

    /// List registered capabilities
    Capabilities,

    /// Diagnose config and backend health
    Doctor,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Chat {
            message,
            domain,
            mode,
            image,
        } => commands::chat::run(message, domain, mode, image).await?,
        Commands::Capabilities => commands::capabilities::run().await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
