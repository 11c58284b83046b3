//! Special commands parser for interactive chat mode
//!
//! This module parses the slash commands that can be entered during an
//! interactive chat. Special commands allow users to:
//! - Create, list, switch, delete and clear chats
//! - Select lines of the document and act on the selection
//! - Write replies or the whole chat back into the document
//! - Run quick actions and manage prompt templates
//! - Choose a model, retry the connection or switch to mock mode
//!
//! Command names are case-insensitive; their arguments keep their case.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during interactive chat
///
/// These commands change the chat state or act on the document, rather
/// than being sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Display help information
    Help,

    /// Start a new chat and make it current
    NewChat,

    /// List all chats
    ListChats,

    /// Make the chat at this 1-based position current
    SwitchChat(usize),

    /// Delete the chat at this 1-based position, or the current chat
    DeleteChat(Option<usize>),

    /// Remove every message from the current chat
    ClearChat,

    /// List loaded models
    ListModels,

    /// Select a loaded model
    SwitchModel(String),

    /// Select an inclusive, 1-based line range of the document
    SelectLines { first: usize, last: usize },

    /// Drop the document selection
    ClearSelection,

    /// Show the selected text
    ShowSelection,

    /// Send the draft (if any) followed by the selected text
    UseSelection(Option<String>),

    /// Replace the selection with the last assistant reply
    Apply,

    /// Replace the selection with the whole chat transcript
    InsertChat,

    /// Write the chat transcript to a file
    Export(Option<PathBuf>),

    /// Run a quick action on the selection
    ///
    /// Use `/prompt custom` to list templates instead.
    QuickAction(String),

    /// List prompt templates
    ListPrompts,

    /// Create a prompt template interactively
    NewPrompt,

    /// Edit a prompt template interactively
    EditPrompt(String),

    /// Delete a prompt template
    DeletePrompt(String),

    /// Render a template with the selection and send it
    UseTemplate(String),

    /// Check the connection again
    Retry,

    /// Switch to simulated replies
    MockMode,

    /// Display chat, model and connection status
    ShowStatus,

    /// Exit the interactive session
    Exit,

    /// Not a special command
    ///
    /// The input should be sent to the model as a regular message.
    None,
}

/// Parse a user input string into a special command
///
/// # Arguments
///
/// * `input` - The user input string to parse
///
/// # Returns
///
/// Returns Ok(SpecialCommand) for valid commands or SpecialCommand::None for non-commands.
///
/// # Errors
///
/// Returns CommandError::UnknownCommand if input starts with "/" but is not a valid command.
/// Returns CommandError::UnsupportedArgument if a command receives an invalid argument.
/// Returns CommandError::MissingArgument if a command requires an argument but none was provided.
///
/// # Examples
///
/// ```
/// use docchat::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// let cmd = parse_special_command("/select 3-5").unwrap();
/// assert_eq!(cmd, SpecialCommand::SelectLines { first: 3, last: 5 });
///
/// let cmd = parse_special_command("/model llama3.2").unwrap();
/// assert_eq!(cmd, SpecialCommand::SwitchModel("llama3.2".to_string()));
///
/// let cmd = parse_special_command("hello model").unwrap();
/// assert_eq!(cmd, SpecialCommand::None);
///
/// // Invalid command returns error
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    // If input doesn't start with "/", it's not a command (except exit/quit)
    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    let (name, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((name, rest)) => (name.to_lowercase(), rest.trim()),
        None => (lower.clone(), ""),
    };
    let arg = (!rest.is_empty()).then(|| rest.to_string());

    match name.as_str() {
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "/status" => Ok(SpecialCommand::ShowStatus),
        "exit" | "quit" | "/exit" | "/quit" => Ok(SpecialCommand::Exit),

        // Chats
        "/new" => Ok(SpecialCommand::NewChat),
        "/chats" => Ok(SpecialCommand::ListChats),
        "/clear" => Ok(SpecialCommand::ClearChat),
        "/switch" => match arg {
            Some(arg) => Ok(SpecialCommand::SwitchChat(parse_position("/switch", &arg)?)),
            None => Err(CommandError::MissingArgument {
                command: "/switch".to_string(),
                usage: "/switch <chat number>".to_string(),
            }),
        },
        "/delete" => match arg {
            Some(arg) => Ok(SpecialCommand::DeleteChat(Some(parse_position(
                "/delete", &arg,
            )?))),
            None => Ok(SpecialCommand::DeleteChat(None)),
        },

        // Models and connection
        "/models" => Ok(SpecialCommand::ListModels),
        "/model" => arg.map(SpecialCommand::SwitchModel).ok_or_else(|| {
            CommandError::MissingArgument {
                command: "/model".to_string(),
                usage: "/model <model_name>".to_string(),
            }
        }),
        "/retry" => Ok(SpecialCommand::Retry),
        "/mock" => Ok(SpecialCommand::MockMode),

        // Document
        "/select" => match arg.as_deref() {
            None => Err(CommandError::MissingArgument {
                command: "/select".to_string(),
                usage: "/select <line>[-<line>] | /select none".to_string(),
            }),
            Some(range) if range.eq_ignore_ascii_case("none") => {
                Ok(SpecialCommand::ClearSelection)
            }
            Some(range) => parse_line_range(range),
        },
        "/selection" => Ok(SpecialCommand::ShowSelection),
        "/use" => Ok(SpecialCommand::UseSelection(arg)),
        "/apply" => Ok(SpecialCommand::Apply),
        "/insert-chat" => Ok(SpecialCommand::InsertChat),
        "/export" => Ok(SpecialCommand::Export(arg.map(PathBuf::from))),

        // Prompts
        "/prompt" => arg
            .map(|a| SpecialCommand::QuickAction(a.to_lowercase()))
            .ok_or_else(|| CommandError::MissingArgument {
                command: "/prompt".to_string(),
                usage: "/prompt <summarize|key-points|explain|analyze|translate-en|translate-zh|next-steps|custom>"
                    .to_string(),
            }),
        "/prompts" => Ok(SpecialCommand::ListPrompts),
        "/prompt-new" => Ok(SpecialCommand::NewPrompt),
        "/prompt-edit" => arg.map(SpecialCommand::EditPrompt).ok_or_else(|| {
            CommandError::MissingArgument {
                command: "/prompt-edit".to_string(),
                usage: "/prompt-edit <prompt_id>".to_string(),
            }
        }),
        "/prompt-delete" => arg.map(SpecialCommand::DeletePrompt).ok_or_else(|| {
            CommandError::MissingArgument {
                command: "/prompt-delete".to_string(),
                usage: "/prompt-delete <prompt_id>".to_string(),
            }
        }),
        "/template" => arg.map(SpecialCommand::UseTemplate).ok_or_else(|| {
            CommandError::MissingArgument {
                command: "/template".to_string(),
                usage: "/template <prompt_id>".to_string(),
            }
        }),

        // Unknown command starting with "/"
        other => Err(CommandError::UnknownCommand(other.to_string())),
    }
}

fn parse_position(command: &str, arg: &str) -> Result<usize, CommandError> {
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(CommandError::UnsupportedArgument {
            command: command.to_string(),
            arg: arg.to_string(),
        }),
    }
}

fn parse_line_range(range: &str) -> Result<SpecialCommand, CommandError> {
    let unsupported = || CommandError::UnsupportedArgument {
        command: "/select".to_string(),
        arg: range.to_string(),
    };

    let (first, last) = match range.split_once('-') {
        Some((first, last)) => (first.trim(), last.trim()),
        None => (range, range),
    };
    let first = first.parse::<usize>().map_err(|_| unsupported())?;
    let last = last.parse::<usize>().map_err(|_| unsupported())?;
    if first == 0 || last < first {
        return Err(unsupported());
    }
    Ok(SpecialCommand::SelectLines { first, last })
}

/// Display help text for special commands
///
/// # Examples
///
/// ```
/// use docchat::commands::special_commands::print_help;
///
/// print_help();
/// ```
pub fn print_help() {
    println!(
        r#"
Special Commands for Interactive Chat
=====================================

CHATS:
  /new                - Start a new chat
  /chats              - List chats (* marks the current one)
  /switch <n>         - Switch to chat number n
  /delete [n]         - Delete chat n (default: the current chat)
  /clear              - Remove all messages from the current chat
  /export [path]      - Save the chat as plain text (default: chat-export.txt)

DOCUMENT:
  /select <a>[-<b>]   - Select lines a through b of the document
  /select none        - Clear the selection
  /selection          - Show the selected text
  /use [text]         - Send text followed by the selected text
  /apply              - Replace the selection with the last reply
  /insert-chat        - Replace the selection with the whole chat

QUICK ACTIONS (act on the selection):
  /prompt summarize   - Summarize the selection
  /prompt key-points  - Extract key points
  /prompt explain     - Explain in simple terms
  /prompt analyze     - Analyze content and structure
  /prompt translate-en - Translate to English
  /prompt translate-zh - Translate to Chinese
  /prompt next-steps  - Suggest next steps
  /prompt custom      - List prompt templates

PROMPT TEMPLATES:
  /prompts            - List templates
  /template <id>      - Send a template rendered with the selection
  /prompt-new         - Create a template
  /prompt-edit <id>   - Edit a template
  /prompt-delete <id> - Delete a template

MODELS AND CONNECTION:
  /models             - List models (* marks the selected one)
  /model <name>       - Select a model
  /retry              - Check the Ollama connection again
  /mock               - Use simulated replies
  /status             - Show chat, model and connection status

OTHER:
  /help               - Show this help message
  exit, quit          - Exit the chat

Anything else is sent to the model as a message.
"#
    );
}
