//! Chat views
//!
//! A view renders what the controller tells it to; it never owns state.

use crate::client::ModelInfo;
use crate::prompts::PromptTemplate;
use crate::session::{ChatMessage, ChatSession, MessageKind};
use colored::Colorize;

/// Loading indicator text
pub const LOADING_TEXT: &str = "Thinking...";

/// Projection of chat state onto some output
pub trait ChatView: Send {
    /// Show one appended message
    fn render_message(&mut self, message: &ChatMessage);

    /// Replace the visible transcript with a session's messages
    fn render_transcript(&mut self, session: &ChatSession);

    /// Show the loading indicator
    fn show_loading(&mut self);

    /// Remove the loading indicator
    fn hide_loading(&mut self);

    /// Transient notification, not part of the transcript
    fn notify(&mut self, text: &str);

    /// List the sessions, marking the current one
    fn show_sessions(&mut self, sessions: &[ChatSession], current_id: &str);

    /// Show a preview of the selected document text
    fn show_selection(&mut self, preview: &str);

    /// List models, marking the selected one
    fn show_models(&mut self, models: &[ModelInfo], selected: Option<&str>, simulated: bool);

    /// List prompt templates
    fn show_templates(&mut self, templates: &[PromptTemplate]);
}

/// Prints to stdout with colors
#[derive(Debug, Default)]
pub struct TerminalView;

impl TerminalView {
    /// Create a terminal view
    pub fn new() -> Self {
        Self
    }

    fn print_message(message: &ChatMessage) {
        match message.kind {
            MessageKind::User => println!("{} {}", "You:".bold().blue(), message.content),
            MessageKind::Assistant => {
                println!("{}\n{}", "Assistant:".bold().green(), message.content)
            }
            MessageKind::System => println!("{}", message.content.italic().yellow()),
            MessageKind::Error => println!("{}", message.content.red()),
        }
        println!();
    }
}

impl ChatView for TerminalView {
    fn render_message(&mut self, message: &ChatMessage) {
        Self::print_message(message);
    }

    fn render_transcript(&mut self, session: &ChatSession) {
        println!("{}", format!("── {} ──", session.name).bold());
        if session.messages.is_empty() {
            println!("{}\n", "(empty)".dimmed());
        }
        for message in &session.messages {
            Self::print_message(message);
        }
    }

    fn show_loading(&mut self) {
        println!("{}", LOADING_TEXT.dimmed());
    }

    fn hide_loading(&mut self) {}

    fn notify(&mut self, text: &str) {
        println!("{} {}\n", "»".cyan(), text);
    }

    fn show_sessions(&mut self, sessions: &[ChatSession], current_id: &str) {
        for (i, session) in sessions.iter().enumerate() {
            let marker = if session.id == current_id { "*" } else { " " };
            println!(
                "{} {}. {} ({} messages)",
                marker.green(),
                i + 1,
                session.name,
                session.messages.len()
            );
        }
        println!();
    }

    fn show_selection(&mut self, preview: &str) {
        println!("{}\n{}\n", "Selected Text:".bold(), preview.dimmed());
    }

    fn show_models(&mut self, models: &[ModelInfo], selected: Option<&str>, simulated: bool) {
        if models.is_empty() {
            println!("No models available\n");
            return;
        }
        for model in models {
            let marker = if Some(model.name.as_str()) == selected {
                "*"
            } else {
                " "
            };
            let suffix = if simulated { " (mock)" } else { "" };
            println!("{} {}{}", marker.green(), model.name, suffix);
        }
        println!();
    }

    fn show_templates(&mut self, templates: &[PromptTemplate]) {
        if templates.is_empty() {
            println!("No prompt templates\n");
            return;
        }
        for template in templates {
            println!(
                "  {} [{}] {}",
                template.id.cyan(),
                template.category,
                template.name.bold()
            );
            if !template.description.is_empty() {
                println!("      {}", template.description.dimmed());
            }
        }
        println!();
    }
}

/// Something a [`RecordingView`] saw
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    /// A message was appended
    Message(ChatMessage),
    /// The transcript was replaced by the named session
    Transcript {
        /// Session name
        name: String,
        /// Number of messages replayed
        messages: usize,
    },
    /// Loading indicator shown
    LoadingShown,
    /// Loading indicator removed
    LoadingHidden,
    /// Transient notification
    Notice(String),
    /// Session list shown
    Sessions(Vec<String>),
    /// Selection preview shown
    Selection(String),
    /// Model list shown
    Models(Vec<String>),
    /// Template list shown
    Templates(Vec<String>),
}

/// Records every call, for tests and embedders that render elsewhere
#[derive(Debug, Default)]
pub struct RecordingView {
    /// Events in call order
    pub events: Vec<ViewEvent>,
}

impl RecordingView {
    /// Create an empty recording
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications received so far
    pub fn notices(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ViewEvent::Notice(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Messages rendered so far
    pub fn messages(&self) -> Vec<&ChatMessage> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ViewEvent::Message(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    /// Forget recorded events
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl ChatView for RecordingView {
    fn render_message(&mut self, message: &ChatMessage) {
        self.events.push(ViewEvent::Message(message.clone()));
    }

    fn render_transcript(&mut self, session: &ChatSession) {
        self.events.push(ViewEvent::Transcript {
            name: session.name.clone(),
            messages: session.messages.len(),
        });
    }

    fn show_loading(&mut self) {
        self.events.push(ViewEvent::LoadingShown);
    }

    fn hide_loading(&mut self) {
        self.events.push(ViewEvent::LoadingHidden);
    }

    fn notify(&mut self, text: &str) {
        self.events.push(ViewEvent::Notice(text.to_string()));
    }

    fn show_sessions(&mut self, sessions: &[ChatSession], _current_id: &str) {
        self.events.push(ViewEvent::Sessions(
            sessions.iter().map(|s| s.name.clone()).collect(),
        ));
    }

    fn show_selection(&mut self, preview: &str) {
        self.events.push(ViewEvent::Selection(preview.to_string()));
    }

    fn show_models(&mut self, models: &[ModelInfo], _selected: Option<&str>, _simulated: bool) {
        self.events.push(ViewEvent::Models(
            models.iter().map(|m| m.name.clone()).collect(),
        ));
    }

    fn show_templates(&mut self, templates: &[PromptTemplate]) {
        self.events.push(ViewEvent::Templates(
            templates.iter().map(|t| t.id.clone()).collect(),
        ));
    }
}
