//! DocChat - chat with a local Ollama server about a document
//!
//! This library provides the pieces of DocChat: a CORS-friendly relay in
//! front of the Ollama API, a model client that degrades to mock replies
//! when the server cannot be used, a liveness detector, and the chat
//! controller that ties sessions, prompt templates and the document
//! selection together.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `relay`: HTTP/HTTPS forwarder with a synthesized health endpoint
//! - `client`: Model catalog and generation through the relay, with mock fallback
//! - `liveness`: Ordered probe cascade deciding whether Ollama is reachable
//! - `controller`: Chat state machine and the views it renders to
//! - `session`: Chat sessions and their transcripts
//! - `prompts`: Quick actions and the prompt template library
//! - `document`: Access to the selected text of a document
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use docchat::client::ModelClient;
//! use docchat::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let client = ModelClient::new(&config.client)?;
//!     println!("{}", client.chat("mistral", "Hello").await);
//!     Ok(())
//! }
//! ```

pub mod chat_mode;
pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod controller;
pub mod document;
pub mod error;
pub mod liveness;
pub mod prompts;
pub mod relay;
pub mod session;

// Re-export commonly used types
pub use client::{ModelClient, ModelInfo};
pub use config::Config;
pub use controller::ChatController;
pub use error::{DocchatError, Result};
pub use session::{ChatMessage, ChatSession, SessionStore};

#[cfg(test)]
pub mod test_utils;
