//! Prompt templates
//!
//! This module holds the prompt template library used by the chat: the
//! seeded templates, user-created templates (kept in memory only), and the
//! placeholder substitution that injects selected document text.

pub mod quick;

use crate::error::{DocchatError, Result};
use serde::{Deserialize, Serialize};

pub use quick::{build_prompt, PromptRequest, QuickAction};

/// Token replaced by the selected document text
pub const SELECTED_TEXT_PLACEHOLDER: &str = "{{selectedText}}";

/// Categories offered when creating or editing a template
pub const PROMPT_CATEGORIES: &[&str] = &["General", "Academic", "Business", "Creative", "Default"];

/// Notification shown when a required template field is blank
pub const REQUIRED_FIELDS_MESSAGE: &str = "Please fill in all required fields";

/// Substitute the first placeholder occurrence with the selected text
///
/// Every other character of the template is left untouched. A template
/// without the placeholder is returned unchanged.
///
/// # Arguments
///
/// * `template` - Template content
/// * `selected_text` - Text that replaces the placeholder
///
/// # Examples
///
/// ```
/// use docchat::prompts::render;
///
/// assert_eq!(render("Fix: {{selectedText}}", "teh cat"), "Fix: teh cat");
/// assert_eq!(render("No placeholder", "ignored"), "No placeholder");
/// ```
pub fn render(template: &str, selected_text: &str) -> String {
    template.replacen(SELECTED_TEXT_PLACEHOLDER, selected_text, 1)
}

/// A reusable instruction with a selected-text placeholder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplate {
    /// Unique identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Short description shown in listings
    #[serde(default)]
    pub description: String,
    /// One of [`PROMPT_CATEGORIES`]
    pub category: String,
    /// Template text, usually containing [`SELECTED_TEXT_PLACEHOLDER`]
    pub content: String,
}

impl PromptTemplate {
    /// Render this template with the selected text
    pub fn render(&self, selected_text: &str) -> String {
        render(&self.content, selected_text)
    }
}

/// Fields of a template being created or edited
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptDraft {
    /// Display name (required)
    pub name: String,
    /// Description (optional)
    #[serde(default)]
    pub description: String,
    /// Category (required)
    pub category: String,
    /// Template text (required)
    pub content: String,
}

impl PromptDraft {
    /// Check the required fields
    ///
    /// # Errors
    ///
    /// Returns `DocchatError::Validation` when name, category or content
    /// is blank.
    pub fn validate(&self) -> Result<()> {
        let missing = [&self.name, &self.category, &self.content]
            .iter()
            .any(|field| field.trim().is_empty());
        if missing {
            return Err(DocchatError::Validation(REQUIRED_FIELDS_MESSAGE.to_string()).into());
        }
        Ok(())
    }

    fn into_template(self, id: String) -> PromptTemplate {
        PromptTemplate {
            id,
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            category: self.category.trim().to_string(),
            content: self.content,
        }
    }
}

/// In-memory template library
///
/// Starts with the seeded templates; user templates are appended and are
/// lost when the process exits.
#[derive(Debug, Clone, Default)]
pub struct PromptLibrary {
    templates: Vec<PromptTemplate>,
}

impl PromptLibrary {
    /// Create an empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a library seeded with the default templates
    ///
    /// # Examples
    ///
    /// ```
    /// use docchat::prompts::PromptLibrary;
    ///
    /// let library = PromptLibrary::with_builtins();
    /// assert!(library.get("general-editor").is_some());
    /// ```
    pub fn with_builtins() -> Self {
        let seed = |id: &str, name: &str, description: &str, content: &str| PromptTemplate {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            category: "Default".to_string(),
            content: content.to_string(),
        };

        Self {
            templates: vec![
                seed(
                    "general-editor",
                    "General Editor",
                    "Improve text while keeping its meaning",
                    "Please edit and improve the following text while maintaining the original meaning:\n\n{{selectedText}}",
                ),
                seed(
                    "academic-writing",
                    "Academic Writing",
                    "Clearer prose with a scholarly tone",
                    "Please improve the following academic text, enhancing clarity and scholarly tone:\n\n{{selectedText}}",
                ),
                seed(
                    "business-reviewer",
                    "Business Reviewer",
                    "Suggestions for business documents",
                    "Please review this business document excerpt and suggest improvements:\n\n{{selectedText}}",
                ),
                seed(
                    "creative-coach",
                    "Creative Writing Coach",
                    "Feedback on creative writing",
                    "Please provide feedback on this creative writing excerpt:\n\n{{selectedText}}",
                ),
            ],
        }
    }

    /// Create a library with the default templates followed by `drafts`
    ///
    /// Drafts with a blank required field are skipped with a warning.
    pub fn with_configured(drafts: &[PromptDraft]) -> Self {
        let mut library = Self::with_builtins();
        for draft in drafts {
            if let Err(e) = library.create(draft.clone()) {
                tracing::warn!(name = %draft.name, "Skipping configured prompt: {}", e);
            }
        }
        library
    }

    /// All templates in insertion order
    pub fn list(&self) -> &[PromptTemplate] {
        &self.templates
    }

    /// Look up a template by id
    pub fn get(&self, id: &str) -> Option<&PromptTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    /// Add a user template
    ///
    /// # Returns
    ///
    /// The id assigned to the new template (`custom-<unique>`)
    ///
    /// # Errors
    ///
    /// Returns a validation error when a required field is blank.
    pub fn create(&mut self, draft: PromptDraft) -> Result<String> {
        draft.validate()?;
        let id = format!("custom-{}", uuid::Uuid::new_v4().simple());
        tracing::debug!(template = %id, "Created prompt template");
        self.templates.push(draft.into_template(id.clone()));
        Ok(id)
    }

    /// Replace the fields of an existing template
    ///
    /// # Errors
    ///
    /// Returns a validation error for blank required fields, or when the id
    /// is unknown.
    pub fn update(&mut self, id: &str, draft: PromptDraft) -> Result<()> {
        draft.validate()?;
        let slot = self
            .templates
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| DocchatError::Validation(format!("Unknown prompt: {}", id)))?;
        *slot = draft.into_template(id.to_string());
        Ok(())
    }

    /// Remove a template
    ///
    /// # Errors
    ///
    /// Returns a validation error when the id is unknown.
    pub fn delete(&mut self, id: &str) -> Result<PromptTemplate> {
        let index = self
            .templates
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| DocchatError::Validation(format!("Unknown prompt: {}", id)))?;
        Ok(self.templates.remove(index))
    }
}
