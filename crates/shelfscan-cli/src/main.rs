use std::path::PathBuf;

use clap::{Parser, Subcommand};
use shelfscan_core::LogConfig;
use tracing_subscriber::EnvFilter;

mod merge;
mod scan;

#[derive(Debug, Parser)]
#[command(name = "shelfscan-cli")]
#[command(about = "Shelf photo intake: OCR extraction and record merging")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a live intake session over product photos, in capture order
    Scan {
        /// Image files, one extraction pass each
        #[arg(required = true)]
        images: Vec<PathBuf>,
        /// Provider label for passes the service does not name
        #[arg(long)]
        provider: Option<String>,
    },
    /// Fold saved extraction payloads (JSON files) in argument order
    Merge {
        #[arg(required = true)]
        payloads: Vec<PathBuf>,
        /// Provider label for payloads that do not name one
        #[arg(long, default_value = "ocr")]
        provider: String,
    },
}

/// Logs go to stderr; stdout carries the JSON result.
fn init_tracing(logging: &LogConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(logging.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_ansi(logging.env.ansi_logs())
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Scan { images, provider }) => {
            let config = shelfscan_core::load_app_config()?;
            init_tracing(&config.logging)?;
            scan::run_scan(&config, &images, provider.as_deref()).await?;
        }
        Some(Commands::Merge { payloads, provider }) => {
            // Offline: no OCR endpoint is needed, so full config is not loaded.
            init_tracing(&shelfscan_core::load_log_config_from_env()?)?;
            merge::run_merge(&payloads, &provider).await?;
        }
        None => println!("shelfscan-cli: no command given, see --help"),
    }

    Ok(())
}
