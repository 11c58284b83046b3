//! Chat controller
//!
//! Drives the chat: owns the session store and the template library, asks
//! the model client for replies, reads and writes the document selection,
//! and tells the view what to show. Every failure ends up as something
//! displayed; nothing here returns an error to the caller.

pub mod view;

use crate::chat_mode::{ConnectionMode, PromptLine};
use crate::client::{mock_catalog, mock_response, MockReason, ModelClient, ModelInfo};
use crate::config::ChatConfig;
use crate::document::{selection_preview, DocumentHost};
use crate::error::DocchatError;
use crate::prompts::{build_prompt, PromptDraft, PromptLibrary, PromptRequest};
use crate::session::{ChatMessage, SessionError, SessionStore};
use std::path::{Path, PathBuf};

pub use view::{ChatView, RecordingView, TerminalView, ViewEvent, LOADING_TEXT};

/// Shown after a chat is created
pub const NEW_CHAT_MESSAGE: &str =
    "New chat started. Select text from your document or type a message to begin.";

/// Shown after a successful write into the document
pub const INSERT_SUCCESS: &str = "✓ Text successfully inserted into document";

/// Shown when writing into the document fails
pub const INSERT_FAILURE: &str =
    "Failed to insert text into document. Please make sure the document is active.";

/// Shown when an action needs a selection and there is none
pub const SELECT_TEXT_FIRST: &str = "Please select text from the document first";

/// Shown when the selection cannot be read
pub const SELECTION_ERROR: &str = "Error accessing the selected text";

/// Shown when models were listed but liveness was not confirmed
pub const CONNECTION_WARNING: &str = "Warning: Models were loaded but we couldn't verify if Ollama is fully accessible.
You may still be able to chat, but if you experience issues:
1. Make sure Ollama is running with 'ollama serve'
2. Run /retry to check the connection again";

/// Shown when no models are available
pub const CONNECTION_ERROR: &str = "Unable to connect to Ollama. Please make sure:
1. Ollama is installed on your machine
2. The Ollama service is running
3. It's accessible at http://localhost:11434

To install and run Ollama:
1. Visit https://ollama.ai to download
2. Install Ollama
3. Run 'ollama serve' in terminal
4. Pull a model: 'ollama pull mistral'

You can still chat with mock responses for testing. Run /retry to check the connection again or /mock to use mock mode.";

/// Shown when mock mode is chosen
pub const MOCK_MODE_MESSAGE: &str = "Using mock mode. Replies are simulated.
To use real Ollama models, make sure Ollama is running and run /retry.";

/// Shown when a retry finds the server
pub const RETRY_SUCCESS: &str =
    "Connection successful! Ollama is running and accessible. You can now chat with your models.";

/// Interactive chat state machine
pub struct ChatController<D: DocumentHost, V: ChatView> {
    client: ModelClient,
    document: D,
    view: V,
    sessions: SessionStore,
    prompts: PromptLibrary,
    models: Vec<ModelInfo>,
    selected_model: Option<String>,
    preferred_model: Option<String>,
    default_model: String,
    export_path: PathBuf,
    mode: ConnectionMode,
}

impl<D: DocumentHost, V: ChatView> ChatController<D, V> {
    /// Create a controller with one empty chat and the seeded templates
    ///
    /// # Arguments
    ///
    /// * `client` - Model client used for catalog and replies
    /// * `document` - Document the selection is read from and written to
    /// * `view` - Where output goes
    /// * `config` - Chat defaults
    pub fn new(client: ModelClient, document: D, view: V, config: &ChatConfig) -> Self {
        Self {
            client,
            document,
            view,
            sessions: SessionStore::new(),
            prompts: PromptLibrary::with_configured(&config.prompts),
            models: Vec::new(),
            selected_model: None,
            preferred_model: None,
            default_model: config.default_model.clone(),
            export_path: config.export_path.clone(),
            mode: ConnectionMode::Offline,
        }
    }

    /// Select this model instead of the first listed one when available
    pub fn with_preferred_model(mut self, model: Option<String>) -> Self {
        self.preferred_model = model;
        self
    }

    /// Probe the server, load models and greet the user
    pub async fn initialize(&mut self) {
        let reachable = self.client.is_reachable().await;
        let models = if reachable {
            self.client.list_models().await
        } else {
            mock_catalog()
        };
        self.load_models(models);

        match self.selected_model.clone() {
            None => {
                self.mode = ConnectionMode::Offline;
                self.push(ChatMessage::error(CONNECTION_ERROR));
            }
            Some(model) if reachable => {
                self.mode = ConnectionMode::Live;
                self.push(ChatMessage::system(format!(
                    "Ready to chat! Using model: {}",
                    model
                )));
            }
            Some(_) => {
                self.mode = ConnectionMode::Unverified;
                self.push(ChatMessage::system(CONNECTION_WARNING));
            }
        }
        tracing::info!(mode = %self.mode, model = ?self.selected_model, "Chat initialized");
    }

    /// Forget the cached liveness result and check again
    pub async fn retry_connection(&mut self) {
        self.view.notify("Checking Ollama connection...");
        if self.client.recheck().await {
            self.mode = ConnectionMode::Live;
            let models = self.client.list_models().await;
            self.load_models(models);
            self.push(ChatMessage::system(RETRY_SUCCESS));
            if let Some(model) = self.selected_model.clone() {
                self.push(ChatMessage::system(format!(
                    "Ready to chat! Using model: {}",
                    model
                )));
            }
        } else {
            if self.mode == ConnectionMode::Live {
                self.mode = ConnectionMode::Unverified;
            }
            self.push(ChatMessage::error(CONNECTION_ERROR));
        }
    }

    /// Switch to simulated replies with the mock catalog
    pub fn use_mock_mode(&mut self) {
        self.mode = ConnectionMode::Mock;
        self.load_models(mock_catalog());
        self.push(ChatMessage::system(MOCK_MODE_MESSAGE));
        self.show_models();
    }

    /// Send a message to the selected model
    ///
    /// Blank input is ignored. The loading indicator is shown before the
    /// request and removed before the reply is appended.
    pub async fn send_message(&mut self, text: &str) {
        if text.trim().is_empty() {
            tracing::debug!("Ignoring empty message");
            return;
        }

        self.push(ChatMessage::user(text));
        self.view.show_loading();

        let reply = if self.mode.answers_locally() {
            mock_response(MockReason::Unreachable, text)
        } else {
            let model = self.active_model();
            let reply = self.client.chat(&model, text).await;
            self.promote_if_reachable();
            reply
        };

        self.view.hide_loading();
        self.push(ChatMessage::assistant(reply));
    }

    /// Replace the document selection with `text`
    pub async fn apply_to_document(&mut self, text: &str) {
        if text.trim().is_empty() {
            tracing::debug!("Nothing to apply");
            return;
        }
        match self.document.replace_selection(text).await {
            Ok(()) => self.view.notify(INSERT_SUCCESS),
            Err(e) => {
                tracing::error!("Failed to apply text to {}: {}", self.document.describe(), e);
                self.push(ChatMessage::error(INSERT_FAILURE));
            }
        }
    }

    /// Apply the newest assistant reply of the current chat
    pub async fn apply_last_response(&mut self) {
        match self.sessions.current().last_assistant() {
            Some(message) => {
                let text = message.content.clone();
                self.apply_to_document(&text).await;
            }
            None => self.view.notify("No assistant response to apply yet"),
        }
    }

    /// Replace the selection with the whole transcript of the current chat
    pub async fn insert_transcript(&mut self) {
        let transcript = self.sessions.current().transcript();
        match self.document.replace_selection(&transcript).await {
            Ok(()) => self.view.notify(INSERT_SUCCESS),
            Err(e) => tracing::error!("Failed to insert transcript: {}", e),
        }
    }

    /// Write the current transcript as plain text
    ///
    /// Returns the path written, or `None` after notifying the failure.
    pub fn export_chat(&mut self, path: Option<&Path>) -> Option<PathBuf> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(|| self.export_path.clone());
        match std::fs::write(&path, self.sessions.current().transcript()) {
            Ok(()) => {
                self.view
                    .notify(&format!("Chat exported to {}", path.display()));
                Some(path)
            }
            Err(e) => {
                tracing::error!("Failed to export chat to {}: {}", path.display(), e);
                self.view.notify(&format!("Failed to export chat: {}", e));
                None
            }
        }
    }

    /// Run a quick action on the current selection
    pub async fn quick_prompt(&mut self, action: &str) {
        let Some(selected) = self.read_selection().await else {
            return;
        };
        match build_prompt(action, &selected, &self.prompts) {
            PromptRequest::Ready(prompt) => self.send_message(&prompt).await,
            PromptRequest::ChooseTemplate => self.show_templates(),
        }
    }

    /// Render a template with the current selection and send it
    pub async fn use_template(&mut self, id: &str) {
        let Some(content) = self.prompts.get(id).map(|t| t.content.clone()) else {
            self.view.notify(&format!("Prompt not found: {}", id));
            return;
        };
        let Some(selected) = self.read_selection().await else {
            return;
        };
        let prompt = crate::prompts::render(&content, &selected);
        self.send_message(&prompt).await;
    }

    /// Show a preview of the new selection; blank selections are ignored
    pub async fn on_selection_changed(&mut self) {
        match self.document.selected_text().await {
            Ok(text) => {
                if let Some(preview) = selection_preview(&text) {
                    self.view.show_selection(&preview);
                }
            }
            Err(e) => tracing::debug!("Could not read selection: {}", e),
        }
    }

    /// Append the current selection to a draft message
    ///
    /// Returns `None` (after notifying) when nothing is selected.
    pub async fn compose_with_selection(&mut self, draft: &str) -> Option<String> {
        let selected = self.read_selection().await?;
        if draft.trim().is_empty() {
            Some(selected)
        } else {
            Some(format!("{}\n\n{}", draft, selected))
        }
    }

    /// Start a new chat and make it current
    pub fn new_chat(&mut self) {
        self.sessions.create();
        self.view.render_transcript(self.sessions.current());
        self.push(ChatMessage::system(NEW_CHAT_MESSAGE));
    }

    /// Delete a chat; the last remaining chat cannot be deleted
    pub fn delete_chat(&mut self, id: &str) {
        let was_current = self.sessions.current_id() == id;
        match self.sessions.delete(id) {
            Ok(()) => {
                if was_current {
                    self.view.render_transcript(self.sessions.current());
                }
                self.view.notify("Chat deleted");
                self.show_sessions();
            }
            Err(SessionError::LastSession) => self.view.notify("Cannot delete the only chat"),
            Err(e) => self.view.notify(&e.to_string()),
        }
    }

    /// Make another chat current and replay its transcript
    pub fn switch_chat(&mut self, id: &str) {
        match self.sessions.switch(id) {
            Ok(session) => self.view.render_transcript(session),
            Err(e) => self.view.notify(&e.to_string()),
        }
    }

    /// Remove every message from the current chat
    pub fn clear_chat(&mut self) {
        self.sessions.clear_current();
        self.view.render_transcript(self.sessions.current());
    }

    /// Select one of the loaded models
    ///
    /// Returns false (after notifying) for a model that is not loaded.
    pub fn select_model(&mut self, name: &str) -> bool {
        if self.models.iter().any(|m| m.name == name) {
            self.selected_model = Some(name.to_string());
            self.view.notify(&format!("Using model: {}", name));
            true
        } else {
            self.view.notify(&format!("Model not available: {}", name));
            false
        }
    }

    /// Add a prompt template; returns its id
    pub fn create_prompt(&mut self, draft: PromptDraft) -> Option<String> {
        match self.prompts.create(draft) {
            Ok(id) => {
                self.view.notify("Prompt created successfully");
                Some(id)
            }
            Err(e) => {
                self.notify_error(e);
                None
            }
        }
    }

    /// Edit a prompt template
    pub fn update_prompt(&mut self, id: &str, draft: PromptDraft) -> bool {
        match self.prompts.update(id, draft) {
            Ok(()) => {
                self.view.notify("Prompt updated successfully");
                true
            }
            Err(e) => {
                self.notify_error(e);
                false
            }
        }
    }

    /// Remove a prompt template
    pub fn delete_prompt(&mut self, id: &str) -> bool {
        match self.prompts.delete(id) {
            Ok(_) => {
                self.view.notify("Prompt deleted successfully");
                true
            }
            Err(e) => {
                self.notify_error(e);
                false
            }
        }
    }

    /// List the chats
    pub fn show_sessions(&mut self) {
        self.view
            .show_sessions(self.sessions.sessions(), self.sessions.current_id());
    }

    /// List the loaded models
    pub fn show_models(&mut self) {
        self.view.show_models(
            &self.models,
            self.selected_model.as_deref(),
            self.mode.is_simulated(),
        );
    }

    /// List the prompt templates
    pub fn show_templates(&mut self) {
        self.view.show_templates(self.prompts.list());
    }

    /// State shown in the chat prompt
    pub fn prompt_line(&self) -> PromptLine {
        PromptLine {
            session: self.sessions.current().name.clone(),
            model: self.selected_model.clone(),
            mode: self.mode,
        }
    }

    /// Session store
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Template library
    pub fn prompts(&self) -> &PromptLibrary {
        &self.prompts
    }

    /// Loaded models
    pub fn models(&self) -> &[ModelInfo] {
        &self.models
    }

    /// Selected model
    pub fn selected_model(&self) -> Option<&str> {
        self.selected_model.as_deref()
    }

    /// Connection mode
    pub fn mode(&self) -> ConnectionMode {
        self.mode
    }

    /// The document
    pub fn document(&self) -> &D {
        &self.document
    }

    /// The document, mutably (to change the selection)
    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    /// The view
    pub fn view(&self) -> &V {
        &self.view
    }

    /// The view, mutably
    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    fn push(&mut self, message: ChatMessage) {
        self.view.render_message(&message);
        self.sessions.append(message);
    }

    fn promote_if_reachable(&mut self) {
        if matches!(self.mode, ConnectionMode::Unverified | ConnectionMode::Offline)
            && self.client.detector().is_cached()
        {
            tracing::info!(previous = %self.mode, "Ollama became reachable");
            self.mode = ConnectionMode::Live;
        }
    }

    fn active_model(&self) -> String {
        self.selected_model
            .clone()
            .unwrap_or_else(|| self.default_model.clone())
    }

    fn load_models(&mut self, models: Vec<ModelInfo>) {
        let preferred = self
            .preferred_model
            .as_deref()
            .filter(|name| models.iter().any(|m| m.name == *name))
            .map(str::to_string);
        self.selected_model = preferred.or_else(|| models.first().map(|m| m.name.clone()));
        self.models = models;
    }

    async fn read_selection(&mut self) -> Option<String> {
        match self.document.selected_text().await {
            Ok(text) if text.trim().is_empty() => {
                self.view.notify(SELECT_TEXT_FIRST);
                None
            }
            Ok(text) => Some(text),
            Err(e) => {
                tracing::error!("Failed to read selection: {}", e);
                self.view.notify(SELECTION_ERROR);
                None
            }
        }
    }

    fn notify_error(&mut self, err: anyhow::Error) {
        let text = match err.downcast_ref::<DocchatError>() {
            Some(DocchatError::Validation(message)) => message.clone(),
            _ => err.to_string(),
        };
        self.view.notify(&text);
    }
}
