//! In-memory chat sessions
//!
//! The [`SessionStore`] owns every chat transcript and tracks which one is
//! current. It is the single source of truth for the chat view; the view
//! only ever renders what the store holds.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Role of a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Text typed (or composed) by the user
    User,
    /// Text generated by the model
    Assistant,
    /// Status lines produced by the application
    System,
    /// Failures shown inline in the transcript
    Error,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
            Self::System => write!(f, "system"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A single transcript entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the entry
    pub kind: MessageKind,
    /// Text of the entry
    pub content: String,
}

impl ChatMessage {
    /// Create a message of the given kind
    pub fn new(kind: MessageKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageKind::User, content)
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageKind::Assistant, content)
    }

    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageKind::System, content)
    }

    /// Create an error message
    pub fn error(content: impl Into<String>) -> Self {
        Self::new(MessageKind::Error, content)
    }

    fn transcript_label(&self) -> &'static str {
        match self.kind {
            MessageKind::User => "You",
            MessageKind::Assistant => "Assistant",
            MessageKind::System => "System",
            MessageKind::Error => "Error",
        }
    }
}

/// A named, ordered chat transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSession {
    /// Stable identifier (`chat-<uuid>`)
    pub id: String,
    /// Display name, re-derived as `Chat N` after deletions
    pub name: String,
    /// Transcript in append order
    pub messages: Vec<ChatMessage>,
}

impl ChatSession {
    fn new(name: String) -> Self {
        Self {
            id: format!("chat-{}", uuid::Uuid::new_v4()),
            name,
            messages: Vec::new(),
        }
    }

    /// Plain-text transcript, one `Label: content` block per message
    pub fn transcript(&self) -> String {
        self.messages
            .iter()
            .map(|m| format!("{}: {}", m.transcript_label(), m.content))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Most recent assistant message, if any
    pub fn last_assistant(&self) -> Option<&ChatMessage> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.kind == MessageKind::Assistant)
    }
}

/// Errors raised by session bookkeeping
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The collection must keep at least one session
    #[error("Cannot delete the only chat")]
    LastSession,

    /// No session with the given id exists
    #[error("Chat not found: {0}")]
    NotFound(String),
}

impl From<SessionError> for crate::error::DocchatError {
    fn from(err: SessionError) -> Self {
        Self::Session(err.to_string())
    }
}

/// Ordered collection of chat sessions with exactly one current session
///
/// # Examples
///
/// ```
/// use docchat::session::SessionStore;
///
/// let mut store = SessionStore::new();
/// let first = store.current_id().to_string();
/// let second = store.create();
///
/// assert_eq!(store.current_id(), second);
/// store.delete(&second).unwrap();
/// assert_eq!(store.current_id(), first);
/// assert!(store.delete(&first).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Vec<ChatSession>,
    current: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Create a store holding a single empty session named `Chat 1`
    pub fn new() -> Self {
        Self {
            sessions: vec![ChatSession::new("Chat 1".to_string())],
            current: 0,
        }
    }

    /// Append a new empty session and make it current
    ///
    /// # Returns
    ///
    /// The id of the new session
    pub fn create(&mut self) -> String {
        self.sessions.push(ChatSession::new(String::new()));
        self.current = self.sessions.len() - 1;
        self.renumber();
        let id = self.sessions[self.current].id.clone();
        tracing::debug!(session = %id, "Created chat session");
        id
    }

    /// Delete a session by id
    ///
    /// When the deleted session was current, the preceding session becomes
    /// current (the following one when the first session is deleted).
    ///
    /// # Errors
    ///
    /// Returns `SessionError::LastSession` when only one session remains and
    /// `SessionError::NotFound` for an unknown id.
    pub fn delete(&mut self, id: &str) -> std::result::Result<(), SessionError> {
        if self.sessions.len() <= 1 {
            return Err(SessionError::LastSession);
        }

        let index = self
            .position(id)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;

        let current_id = self.current_id().to_string();
        self.sessions.remove(index);

        self.current = if current_id == id {
            index.saturating_sub(1)
        } else {
            self.position(&current_id).unwrap_or(0)
        };

        self.renumber();
        tracing::debug!(session = %id, "Deleted chat session");
        Ok(())
    }

    /// Make the session with the given id current
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotFound` for an unknown id.
    pub fn switch(&mut self, id: &str) -> std::result::Result<&ChatSession, SessionError> {
        let index = self
            .position(id)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;
        self.current = index;
        Ok(&self.sessions[index])
    }

    /// The current session
    pub fn current(&self) -> &ChatSession {
        &self.sessions[self.current]
    }

    /// Id of the current session
    pub fn current_id(&self) -> &str {
        &self.sessions[self.current].id
    }

    /// Zero-based index of the current session
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Append a message to the current session
    pub fn append(&mut self, message: ChatMessage) {
        self.sessions[self.current].messages.push(message);
    }

    /// Replace the whole transcript of a session
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotFound` for an unknown id.
    pub fn replace_messages(
        &mut self,
        id: &str,
        messages: Vec<ChatMessage>,
    ) -> std::result::Result<(), SessionError> {
        let index = self
            .position(id)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;
        self.sessions[index].messages = messages;
        Ok(())
    }

    /// Remove every message from the current session
    pub fn clear_current(&mut self) {
        self.sessions[self.current].messages.clear();
    }

    /// All sessions in creation order
    pub fn sessions(&self) -> &[ChatSession] {
        &self.sessions
    }

    /// Number of sessions
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Always false; the store never becomes empty
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Index of the session with the given id
    pub fn position(&self, id: &str) -> Option<usize> {
        self.sessions.iter().position(|s| s.id == id)
    }

    /// Id of the session at a zero-based index
    pub fn id_at(&self, index: usize) -> Option<&str> {
        self.sessions.get(index).map(|s| s.id.as_str())
    }

    fn renumber(&mut self) {
        for (i, session) in self.sessions.iter_mut().enumerate() {
            session.name = format!("Chat {}", i + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_store_has_one_session() {
        let store = SessionStore::new();
        assert_eq!(store.len(), 1);
        assert_eq!(store.current().name, "Chat 1");
        assert!(store.current().messages.is_empty());
        assert!(store.current_id().starts_with("chat-"));
    }

    #[test]
    fn test_create_makes_new_session_current() {
        let mut store = SessionStore::new();
        let id = store.create();
        assert_eq!(store.len(), 2);
        assert_eq!(store.current_id(), id);
        assert_eq!(store.current().name, "Chat 2");
    }

    #[test]
    fn test_delete_only_session_is_rejected() {
        let mut store = SessionStore::new();
        let id = store.current_id().to_string();
        assert_eq!(store.delete(&id), Err(SessionError::LastSession));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_session_error_converts_to_docchat_error() {
        let mut store = SessionStore::new();
        let id = store.current_id().to_string();
        crate::test_utils::assert_error_contains(
            store.delete(&id).map_err(crate::error::DocchatError::from),
            "Cannot delete the only chat",
        );
        crate::test_utils::assert_error_contains(
            store
                .switch("chat-missing")
                .map(|_| ())
                .map_err(crate::error::DocchatError::from),
            "chat-missing",
        );
    }

    #[test]
    fn test_delete_second_of_three_prefers_previous() {
        let mut store = SessionStore::new();
        let first = store.current_id().to_string();
        let second = store.create();
        let third = store.create();

        store.switch(&second).unwrap();
        store.delete(&second).unwrap();

        let names: Vec<_> = store.sessions().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Chat 1", "Chat 2"]);
        assert_eq!(store.current_id(), first);
        assert_eq!(store.sessions()[1].id, third);
    }

    #[test]
    fn test_delete_first_current_moves_to_next() {
        let mut store = SessionStore::new();
        let first = store.current_id().to_string();
        let second = store.create();

        store.switch(&first).unwrap();
        store.delete(&first).unwrap();

        assert_eq!(store.current_id(), second);
        assert_eq!(store.current().name, "Chat 1");
    }

    #[test]
    fn test_delete_non_current_keeps_current() {
        let mut store = SessionStore::new();
        let first = store.current_id().to_string();
        let _second = store.create();
        let third = store.create();

        store.delete(&first).unwrap();

        assert_eq!(store.current_id(), third);
        assert_eq!(store.current().name, "Chat 2");
    }

    #[test]
    fn test_delete_unknown_id() {
        let mut store = SessionStore::new();
        store.create();
        assert_eq!(
            store.delete("chat-missing"),
            Err(SessionError::NotFound("chat-missing".to_string()))
        );
    }

    #[test]
    fn test_names_stay_dense_after_many_deletes() {
        let mut store = SessionStore::new();
        let ids: Vec<String> = (0..5).map(|_| store.create()).collect();

        store.delete(&ids[1]).unwrap();
        store.delete(&ids[3]).unwrap();

        for (i, session) in store.sessions().iter().enumerate() {
            assert_eq!(session.name, format!("Chat {}", i + 1));
        }
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_never_empty_after_deleting_everything() {
        let mut store = SessionStore::new();
        store.create();
        store.create();

        while store.len() > 1 {
            let id = store.current_id().to_string();
            store.delete(&id).unwrap();
        }
        let id = store.current_id().to_string();
        assert!(store.delete(&id).is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_switch_keeps_transcripts_separate() {
        let mut store = SessionStore::new();
        let first = store.current_id().to_string();
        store.append(ChatMessage::user("hello"));

        let second = store.create();
        store.append(ChatMessage::user("other"));

        let session = store.switch(&first).unwrap();
        assert_eq!(session.messages, vec![ChatMessage::user("hello")]);

        store.switch(&second).unwrap();
        assert_eq!(store.current().messages, vec![ChatMessage::user("other")]);
    }

    #[test]
    fn test_switch_unknown_id() {
        let mut store = SessionStore::new();
        assert!(store.switch("nope").is_err());
    }

    #[test]
    fn test_replace_messages() {
        let mut store = SessionStore::new();
        let id = store.current_id().to_string();
        store.append(ChatMessage::user("old"));

        store
            .replace_messages(&id, vec![ChatMessage::system("new")])
            .unwrap();

        assert_eq!(store.current().messages, vec![ChatMessage::system("new")]);
    }

    #[test]
    fn test_clear_current() {
        let mut store = SessionStore::new();
        store.append(ChatMessage::user("a"));
        store.append(ChatMessage::assistant("b"));
        store.clear_current();
        assert!(store.current().messages.is_empty());
    }

    #[test]
    fn test_transcript_and_last_assistant() {
        let mut store = SessionStore::new();
        store.append(ChatMessage::user("question"));
        store.append(ChatMessage::assistant("first"));
        store.append(ChatMessage::assistant("second"));
        store.append(ChatMessage::error("oops"));

        let session = store.current();
        assert_eq!(
            session.transcript(),
            "You: question\n\nAssistant: first\n\nAssistant: second\n\nError: oops"
        );
        assert_eq!(session.last_assistant().unwrap().content, "second");
    }

    #[test]
    fn test_message_kind_serializes_lowercase() {
        let json = serde_json::to_string(&ChatMessage::assistant("hi")).unwrap();
        assert_eq!(json, r#"{"kind":"assistant","content":"hi"}"#);
    }
}
