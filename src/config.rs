//! Configuration management for DocChat
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{DocchatError, Result};
use crate::prompts::PromptDraft;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for DocChat
///
/// Holds the relay settings, the model client settings used by the chat
/// and the probe commands, and chat defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Relay (HTTP/HTTPS forwarder) configuration
    #[serde(default)]
    pub relay: RelayConfig,

    /// Model client configuration
    #[serde(default)]
    pub client: ClientConfig,

    /// Chat behavior configuration
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Relay configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Address both listeners bind to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Plaintext port
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// TLS port, used only when a dev certificate pair is found
    #[serde(default = "default_https_port")]
    pub https_port: u16,

    /// Start the TLS listener when certificates are available
    #[serde(default = "default_enable_tls")]
    pub enable_tls: bool,

    /// Directory holding `localhost.crt` and `localhost.key`
    ///
    /// Defaults to `~/.office-addin-dev-certs` when unset.
    #[serde(default)]
    pub cert_dir: Option<PathBuf>,

    /// Base URL of the Ollama API the relay forwards to
    #[serde(default = "default_upstream_url")]
    pub upstream_url: String,
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_http_port() -> u16 {
    3001
}

fn default_https_port() -> u16 {
    3443
}

fn default_enable_tls() -> bool {
    true
}

fn default_upstream_url() -> String {
    "http://localhost:11434/api".to_string()
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            http_port: default_http_port(),
            https_port: default_https_port(),
            enable_tls: default_enable_tls(),
            cert_dir: None,
            upstream_url: default_upstream_url(),
        }
    }
}

impl RelayConfig {
    /// Directory searched for the dev certificate pair
    pub fn resolved_cert_dir(&self) -> Option<PathBuf> {
        self.cert_dir.clone().or_else(|| {
            directories::BaseDirs::new()
                .map(|dirs| dirs.home_dir().join(".office-addin-dev-certs"))
        })
    }
}

/// Model client configuration
///
/// Controls how the chat reaches the relay and how the liveness probes
/// reach the model server directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Relay API base (the `/api/ollama` prefix included)
    #[serde(default = "default_relay_url")]
    pub relay_url: String,

    /// Second relay endpoint probed when the first cannot be reached
    #[serde(default = "default_fallback_relay_url")]
    pub fallback_relay_url: Option<String>,

    /// Model server API base used by the direct probes
    #[serde(default = "default_upstream_url")]
    pub upstream_url: String,

    /// Timeout for catalog and generation calls (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,

    /// Timeout for each liveness probe (milliseconds)
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_ms: u64,

    /// Accept self-signed certificates (the relay serves a dev certificate)
    #[serde(default = "default_accept_invalid_certs")]
    pub accept_invalid_certs: bool,

    /// Count an unreadable transport error on the direct probes as reachable
    #[serde(default = "default_ambiguous_errors_reachable")]
    pub ambiguous_errors_reachable: bool,
}

fn default_relay_url() -> String {
    relay_url_for_port(default_http_port())
}

fn relay_url_for_port(port: u16) -> String {
    format!("http://localhost:{}/api/ollama", port)
}

fn default_fallback_relay_url() -> Option<String> {
    Some("https://localhost:3443/api/ollama".to_string())
}

fn default_request_timeout() -> u64 {
    30
}

fn default_probe_timeout() -> u64 {
    2000
}

fn default_accept_invalid_certs() -> bool {
    true
}

fn default_ambiguous_errors_reachable() -> bool {
    crate::liveness::AMBIGUOUS_ERROR_MEANS_REACHABLE
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            relay_url: default_relay_url(),
            fallback_relay_url: default_fallback_relay_url(),
            upstream_url: default_upstream_url(),
            request_timeout_seconds: default_request_timeout(),
            probe_timeout_ms: default_probe_timeout(),
            accept_invalid_certs: default_accept_invalid_certs(),
            ambiguous_errors_reachable: default_ambiguous_errors_reachable(),
        }
    }
}

/// Chat mode configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Model used when the catalog is empty or nothing was selected
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Where `/export` writes the transcript when no path is given
    #[serde(default = "default_export_path")]
    pub export_path: PathBuf,

    /// Extra prompt templates added after the default ones
    #[serde(default)]
    pub prompts: Vec<PromptDraft>,
}

fn default_model() -> String {
    "mistral".to_string()
}

fn default_export_path() -> PathBuf {
    PathBuf::from("chat-export.txt")
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            default_model: default_model(),
            export_path: default_export_path(),
            prompts: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| DocchatError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| DocchatError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(port) = std::env::var("HTTP_PORT") {
            match port.parse::<u16>() {
                Ok(value) => {
                    self.relay.http_port = value;
                    tracing::debug!(http_port = value, "Env override: HTTP_PORT");
                }
                Err(_) => tracing::warn!("Invalid HTTP_PORT: {}", port),
            }
        }

        if let Ok(upstream) = std::env::var("DOCCHAT_UPSTREAM_URL") {
            self.relay.upstream_url = upstream.clone();
            self.client.upstream_url = upstream;
        }

        if let Ok(relay_url) = std::env::var("DOCCHAT_RELAY_URL") {
            self.client.relay_url = relay_url;
        } else if self.client.relay_url == default_relay_url()
            && self.relay.http_port != default_http_port()
        {
            self.client.relay_url = relay_url_for_port(self.relay.http_port);
            tracing::debug!(relay_url = %self.client.relay_url, "Relay URL follows HTTP_PORT");
        }

        if let Ok(model) = std::env::var("DOCCHAT_DEFAULT_MODEL") {
            self.chat.default_model = model;
        }

        if let Ok(timeout) = std::env::var("DOCCHAT_REQUEST_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.client.request_timeout_seconds = value;
            } else {
                tracing::warn!("Invalid DOCCHAT_REQUEST_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(cert_dir) = std::env::var("DOCCHAT_CERT_DIR") {
            self.relay.cert_dir = Some(PathBuf::from(cert_dir));
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        match &cli.command {
            crate::cli::Commands::Relay { port, no_tls } => {
                if let Some(port) = port {
                    self.relay.http_port = *port;
                }
                if *no_tls {
                    self.relay.enable_tls = false;
                }
            }
            crate::cli::Commands::Chat {
                model: Some(model), ..
            } => {
                self.chat.default_model = model.clone();
            }
            _ => {}
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.relay.http_port == 0 {
            return Err(DocchatError::Config("relay.http_port must be non-zero".to_string()).into());
        }

        if self.relay.enable_tls && self.relay.https_port == self.relay.http_port {
            return Err(DocchatError::Config(
                "relay.https_port must differ from relay.http_port".to_string(),
            )
            .into());
        }

        validate_url("relay.upstream_url", &self.relay.upstream_url)?;
        validate_url("client.relay_url", &self.client.relay_url)?;
        validate_url("client.upstream_url", &self.client.upstream_url)?;
        if let Some(fallback) = &self.client.fallback_relay_url {
            validate_url("client.fallback_relay_url", fallback)?;
        }

        for (index, draft) in self.chat.prompts.iter().enumerate() {
            draft
                .validate()
                .map_err(|e| DocchatError::Config(format!("chat.prompts[{}]: {}", index, e)))?;
        }

        if self.client.request_timeout_seconds == 0 {
            return Err(DocchatError::Config(
                "client.request_timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.client.probe_timeout_ms == 0 {
            return Err(DocchatError::Config(
                "client.probe_timeout_ms must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

fn validate_url(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DocchatError::Config(format!("{} cannot be empty", name)).into());
    }
    let parsed = url::Url::parse(value)
        .map_err(|e| DocchatError::Config(format!("{} is not a valid URL: {}", name, e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(DocchatError::Config(format!("{} must use http or https", name)).into());
    }
    Ok(())
}
