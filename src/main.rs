//! DocChat - chat with a local Ollama server about a document
//!
#![doc = "DocChat - chat with a local Ollama server about a document"]
#![doc = "Main entry point for the DocChat application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use docchat::cli::{Cli, Commands};
use docchat::commands;
use docchat::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Relay { .. } => {
            tracing::info!("Starting relay mode");
            commands::relay::run_relay(config).await?;
            Ok(())
        }
        Commands::Chat { document, model } => {
            tracing::info!("Starting interactive chat mode");
            tracing::debug!("Using document: {}", document.display());
            if let Some(m) = &model {
                tracing::debug!("Using model override: {}", m);
            }
            commands::chat::run_chat(config, document, model).await?;
            Ok(())
        }
        Commands::Models { json } => {
            commands::models::list_models(&config, json).await?;
            Ok(())
        }
        Commands::Probe => {
            commands::models::probe(&config).await?;
            Ok(())
        }
        Commands::Prompts { json } => {
            commands::prompts::list_prompts(&config, json)?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so `--json` output on stdout stays parseable.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "docchat=debug" } else { "docchat=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
