//! Command-line interface definition for DocChat
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for the relay, interactive chat, model listing,
//! liveness probing and prompt template listing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// DocChat - chat with a local Ollama server about a document
///
/// Runs a CORS-friendly relay in front of Ollama, or an interactive
/// chat that reads the selected part of a document and writes generated
/// text back into it.
#[derive(Parser, Debug, Clone)]
#[command(name = "docchat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for DocChat
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the relay in front of the Ollama server
    Relay {
        /// Plaintext port (overrides HTTP_PORT and the config file)
        #[arg(short, long)]
        port: Option<u16>,

        /// Do not start the TLS listener even if dev certificates exist
        #[arg(long)]
        no_tls: bool,
    },

    /// Start an interactive chat about a document
    Chat {
        /// Plain-text document to read selections from and write into
        #[arg(short, long)]
        document: PathBuf,

        /// Model to select instead of the first one listed
        #[arg(short, long)]
        model: Option<String>,
    },

    /// List the models the relay reports (mock catalog when offline)
    Models {
        /// Print the catalog as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check whether the model server is reachable
    Probe,

    /// List the available prompt templates
    Prompts {
        /// Print the templates as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            command: Commands::Probe,
        }
    }
}
