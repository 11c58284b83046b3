//! Quick actions applied to the selected document text

use super::PromptLibrary;
use std::fmt;

/// Prefix carried by quick actions that refer to a library template
pub const TEMPLATE_ACTION_PREFIX: &str = "custom-";

/// One of the one-click actions offered for a selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuickAction {
    /// Concise summary
    Summarize,
    /// Bullet list of key points
    KeyPoints,
    /// Plain-language explanation
    Explain,
    /// Themes and arguments
    Analyze,
    /// Translation to English
    TranslateEnglish,
    /// Translation to Chinese
    TranslateChinese,
    /// Recommended next steps
    NextSteps,
    /// Open the template picker
    Custom,
    /// A library template, `custom-<template id>`
    Template(String),
    /// Any other action falls back to a generic analysis
    Other(String),
}

impl QuickAction {
    /// Parse an action id
    ///
    /// # Examples
    ///
    /// ```
    /// use docchat::prompts::QuickAction;
    ///
    /// assert_eq!(QuickAction::parse("key-points"), QuickAction::KeyPoints);
    /// assert_eq!(
    ///     QuickAction::parse("custom-general-editor"),
    ///     QuickAction::Template("custom-general-editor".to_string())
    /// );
    /// ```
    pub fn parse(action: &str) -> Self {
        match action.trim() {
            "summarize" => Self::Summarize,
            "key-points" => Self::KeyPoints,
            "explain" => Self::Explain,
            "analyze" => Self::Analyze,
            "translate-en" => Self::TranslateEnglish,
            "translate-zh" => Self::TranslateChinese,
            "next-steps" => Self::NextSteps,
            "custom" => Self::Custom,
            other if other.starts_with(TEMPLATE_ACTION_PREFIX) => Self::Template(other.to_string()),
            other => Self::Other(other.to_string()),
        }
    }

    /// Instruction prepended to the selection for built-in actions
    pub fn instruction(&self) -> &'static str {
        match self {
            Self::Summarize => "Please provide a concise summary of the following text:\n\n",
            Self::KeyPoints => {
                "Please identify and list the key points from the following text:\n\n"
            }
            Self::Explain => {
                "Please explain the following text in simple terms that are easy to understand:\n\n"
            }
            Self::Analyze => {
                "Please analyze the following text, identifying main themes, arguments, and any notable elements:\n\n"
            }
            Self::TranslateEnglish => "Please translate the following text to English:\n\n",
            Self::TranslateChinese => "Please translate the following text to Chinese:\n\n",
            Self::NextSteps => {
                "Based on the following text, what would be the recommended next steps or actions?\n\n"
            }
            Self::Custom | Self::Template(_) | Self::Other(_) => {
                "Please analyze the following text:\n\n"
            }
        }
    }
}

impl fmt::Display for QuickAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Summarize => write!(f, "summarize"),
            Self::KeyPoints => write!(f, "key-points"),
            Self::Explain => write!(f, "explain"),
            Self::Analyze => write!(f, "analyze"),
            Self::TranslateEnglish => write!(f, "translate-en"),
            Self::TranslateChinese => write!(f, "translate-zh"),
            Self::NextSteps => write!(f, "next-steps"),
            Self::Custom => write!(f, "custom"),
            Self::Template(id) | Self::Other(id) => write!(f, "{}", id),
        }
    }
}

/// What a quick action resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptRequest {
    /// Prompt text ready to send
    Ready(String),
    /// The user has to pick a template first
    ChooseTemplate,
}

/// Build the prompt for a quick action
///
/// Template actions resolve `custom-<id>` by stripping the prefix once and
/// looking up `<id>`, then by an exact match on the whole action id. An
/// unresolvable template action falls back to the generic analysis prompt.
///
/// # Arguments
///
/// * `action` - Action id (`summarize`, `custom-general-editor`, ...)
/// * `selected_text` - Text currently selected in the document
/// * `library` - Templates available for `custom-` actions
///
/// # Examples
///
/// ```
/// use docchat::prompts::{build_prompt, PromptLibrary, PromptRequest};
///
/// let library = PromptLibrary::with_builtins();
/// let request = build_prompt("translate-en", "Bonjour", &library);
/// assert_eq!(
///     request,
///     PromptRequest::Ready("Please translate the following text to English:\n\nBonjour".into())
/// );
/// assert_eq!(build_prompt("custom", "x", &library), PromptRequest::ChooseTemplate);
/// ```
pub fn build_prompt(action: &str, selected_text: &str, library: &PromptLibrary) -> PromptRequest {
    let action = QuickAction::parse(action);
    match &action {
        QuickAction::Custom => PromptRequest::ChooseTemplate,
        QuickAction::Template(id) => {
            let stripped = id.strip_prefix(TEMPLATE_ACTION_PREFIX).unwrap_or(id);
            match library.get(stripped).or_else(|| library.get(id)) {
                Some(template) => PromptRequest::Ready(template.render(selected_text)),
                None => {
                    tracing::warn!("Prompt template not found for action {}", id);
                    PromptRequest::Ready(format!("{}{}", action.instruction(), selected_text))
                }
            }
        }
        _ => PromptRequest::Ready(format!("{}{}", action.instruction(), selected_text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::PromptDraft;

    fn ready(request: PromptRequest) -> String {
        match request {
            PromptRequest::Ready(text) => text,
            PromptRequest::ChooseTemplate => panic!("expected a ready prompt"),
        }
    }

    #[test]
    fn test_builtin_actions() {
        let library = PromptLibrary::new();
        let cases = [
            ("summarize", "Please provide a concise summary of the following text:\n\nT"),
            (
                "key-points",
                "Please identify and list the key points from the following text:\n\nT",
            ),
            ("translate-zh", "Please translate the following text to Chinese:\n\nT"),
            (
                "next-steps",
                "Based on the following text, what would be the recommended next steps or actions?\n\nT",
            ),
        ];
        for (action, expected) in cases {
            assert_eq!(ready(build_prompt(action, "T", &library)), expected);
        }
    }

    #[test]
    fn test_unknown_action_uses_generic_analysis() {
        let library = PromptLibrary::new();
        assert_eq!(
            ready(build_prompt("rewrite-as-haiku", "T", &library)),
            "Please analyze the following text:\n\nT"
        );
    }

    #[test]
    fn test_custom_opens_template_picker() {
        let library = PromptLibrary::with_builtins();
        assert_eq!(build_prompt("custom", "T", &library), PromptRequest::ChooseTemplate);
    }

    #[test]
    fn test_template_action_strips_prefix_once() {
        let library = PromptLibrary::with_builtins();
        assert_eq!(
            ready(build_prompt("custom-business-reviewer", "Q3 plan", &library)),
            "Please review this business document excerpt and suggest improvements:\n\nQ3 plan"
        );
    }

    #[test]
    fn test_user_template_resolves_by_prefixed_and_exact_id() {
        let mut library = PromptLibrary::new();
        let id = library
            .create(PromptDraft {
                name: "Shout".to_string(),
                description: String::new(),
                category: "General".to_string(),
                content: "UPPERCASE: {{selectedText}}".to_string(),
            })
            .unwrap();

        assert_eq!(ready(build_prompt(&id, "hi", &library)), "UPPERCASE: hi");
        let prefixed = format!("custom-{}", id);
        assert_eq!(ready(build_prompt(&prefixed, "hi", &library)), "UPPERCASE: hi");
    }

    #[test]
    fn test_missing_template_falls_back() {
        let library = PromptLibrary::new();
        assert_eq!(
            ready(build_prompt("custom-gone", "T", &library)),
            "Please analyze the following text:\n\nT"
        );
    }

    #[test]
    fn test_display_round_trips_ids() {
        for id in ["summarize", "explain", "analyze", "custom", "custom-x"] {
            assert_eq!(QuickAction::parse(id).to_string(), id);
        }
    }
}
