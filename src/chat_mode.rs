//! Connection mode types for interactive chat
//!
//! This module defines how the chat is currently talking to the model
//! server and formats the colored prompt shown by the terminal chat.

use colored::Colorize;
use std::fmt;

/// Connection mode of the chat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionMode {
    /// The liveness check succeeded; replies come from the model
    Live,

    /// Liveness could not be confirmed and the mock catalog is loaded
    ///
    /// Every message still goes to the model client, which checks liveness
    /// again and answers with a mock reply while the server stays down.
    Unverified,

    /// The user chose simulated replies explicitly
    Mock,

    /// No models are available
    Offline,
}

impl fmt::Display for ConnectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Live => write!(f, "LIVE"),
            Self::Unverified => write!(f, "UNVERIFIED"),
            Self::Mock => write!(f, "MOCK"),
            Self::Offline => write!(f, "OFFLINE"),
        }
    }
}

impl ConnectionMode {
    /// Whether replies are simulated in this mode
    ///
    /// # Examples
    ///
    /// ```
    /// use docchat::chat_mode::ConnectionMode;
    ///
    /// assert!(!ConnectionMode::Live.is_simulated());
    /// assert!(ConnectionMode::Mock.is_simulated());
    /// ```
    pub fn is_simulated(&self) -> bool {
        matches!(self, Self::Unverified | Self::Mock)
    }

    /// Whether replies are built locally without asking the model client
    ///
    /// Only an explicit mock choice skips the client.
    ///
    /// # Examples
    ///
    /// ```
    /// use docchat::chat_mode::ConnectionMode;
    ///
    /// assert!(ConnectionMode::Mock.answers_locally());
    /// assert!(!ConnectionMode::Unverified.answers_locally());
    /// ```
    pub fn answers_locally(&self) -> bool {
        matches!(self, Self::Mock)
    }

    /// Get a user-friendly description of this mode
    pub fn description(&self) -> &'static str {
        match self {
            Self::Live => "Connected to Ollama",
            Self::Unverified => "Connection not verified (mock replies until Ollama answers)",
            Self::Mock => "Mock mode (simulated replies)",
            Self::Offline => "Unable to connect to Ollama",
        }
    }

    /// Get a colored tag representation of this mode
    pub fn colored_tag(&self) -> String {
        match self {
            Self::Live => format!("[{}]", "LIVE".green()),
            Self::Unverified => format!("[{}]", "UNVERIFIED".yellow()),
            Self::Mock => format!("[{}]", "MOCK".purple()),
            Self::Offline => format!("[{}]", "OFFLINE".red()),
        }
    }
}

/// Everything the chat prompt shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptLine {
    /// Display name of the current session
    pub session: String,
    /// Selected model, if any
    pub model: Option<String>,
    /// Connection mode
    pub mode: ConnectionMode,
}

impl PromptLine {
    /// Format a prompt string with plain tags
    ///
    /// # Examples
    ///
    /// ```
    /// use docchat::chat_mode::{ConnectionMode, PromptLine};
    ///
    /// let line = PromptLine {
    ///     session: "Chat 2".to_string(),
    ///     model: Some("mistral".to_string()),
    ///     mode: ConnectionMode::Live,
    /// };
    /// assert_eq!(line.format_prompt(), "[Chat 2][mistral][LIVE] >> ");
    /// ```
    pub fn format_prompt(&self) -> String {
        format!(
            "[{}][{}][{}] >> ",
            self.session,
            self.model.as_deref().unwrap_or("no model"),
            self.mode
        )
    }

    /// Format a prompt string with colored tags
    pub fn format_colored_prompt(&self) -> String {
        format!(
            "[{}][{}]{} >> ",
            self.session.bold(),
            self.model.as_deref().unwrap_or("no model").cyan(),
            self.mode.colored_tag()
        )
    }

    /// Multi-line status text
    pub fn status(&self) -> String {
        format!(
            "Chat: {}\nModel: {}\nConnection: {} ({})",
            self.session,
            self.model.as_deref().unwrap_or("none"),
            self.mode,
            self.mode.description()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_mode_display() {
        assert_eq!(ConnectionMode::Live.to_string(), "LIVE");
        assert_eq!(ConnectionMode::Unverified.to_string(), "UNVERIFIED");
        assert_eq!(ConnectionMode::Mock.to_string(), "MOCK");
        assert_eq!(ConnectionMode::Offline.to_string(), "OFFLINE");
    }

    #[test]
    fn test_is_simulated() {
        assert!(ConnectionMode::Unverified.is_simulated());
        assert!(ConnectionMode::Mock.is_simulated());
        assert!(!ConnectionMode::Live.is_simulated());
        assert!(!ConnectionMode::Offline.is_simulated());
    }

    #[test]
    fn test_only_mock_answers_locally() {
        assert!(ConnectionMode::Mock.answers_locally());
        assert!(!ConnectionMode::Unverified.answers_locally());
        assert!(!ConnectionMode::Live.answers_locally());
        assert!(!ConnectionMode::Offline.answers_locally());
    }

    #[test]
    fn test_colored_tag_contains_name() {
        for mode in [
            ConnectionMode::Live,
            ConnectionMode::Unverified,
            ConnectionMode::Mock,
            ConnectionMode::Offline,
        ] {
            assert!(mode.colored_tag().contains(&mode.to_string()));
        }
    }

    #[test]
    fn test_format_prompt_without_model() {
        let line = PromptLine {
            session: "Chat 1".to_string(),
            model: None,
            mode: ConnectionMode::Offline,
        };
        assert_eq!(line.format_prompt(), "[Chat 1][no model][OFFLINE] >> ");
    }

    #[test]
    fn test_status() {
        let line = PromptLine {
            session: "Chat 3".to_string(),
            model: Some("llama3.2".to_string()),
            mode: ConnectionMode::Mock,
        };
        let status = line.status();
        assert!(status.contains("Chat: Chat 3"));
        assert!(status.contains("Model: llama3.2"));
        assert!(status.contains("MOCK"));
    }
}
