//! Command handlers for DocChat
//!
//! This module contains the handlers for the CLI subcommands: the relay,
//! the interactive chat, model listing, the liveness probe and the prompt
//! template listing.

// Special commands parser for interactive chat
pub mod special_commands;

// Model catalog and liveness commands
pub mod models;

/// Interactive chat about a document
pub mod chat {
    use super::special_commands::{parse_special_command, print_help, SpecialCommand};
    use crate::client::ModelClient;
    use crate::config::Config;
    use crate::controller::{ChatController, ChatView, TerminalView};
    use crate::document::{DocumentHost, FileDocument};
    use crate::error::Result;
    use crate::prompts::PromptDraft;
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;
    use std::path::PathBuf;

    /// Reads one line of input given a prompt and pre-filled text
    ///
    /// Returns `None` when input was cancelled.
    pub type Ask<'a> = dyn FnMut(&str, &str) -> Option<String> + 'a;

    /// Start interactive chat mode
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration
    /// * `document` - Plain-text document to read selections from
    /// * `model` - Model to select instead of the first listed one
    ///
    /// # Errors
    ///
    /// Returns error if the document cannot be opened or the terminal
    /// cannot be set up
    pub async fn run_chat(config: Config, document: PathBuf, model: Option<String>) -> Result<()> {
        tracing::info!("Starting interactive chat mode");

        let document = FileDocument::open(&document)?;
        let client = ModelClient::new(&config.client)?;
        let mut controller = ChatController::new(client, document, TerminalView::new(), &config.chat)
            .with_preferred_model(model);

        let mut rl = DefaultEditor::new()?;

        print_welcome_banner(&controller.document().describe());
        controller.initialize().await;

        loop {
            let prompt = controller.prompt_line().format_colored_prompt();
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    rl.add_history_entry(trimmed)?;

                    let command = match parse_special_command(trimmed) {
                        Ok(command) => command,
                        Err(e) => {
                            eprintln!("{}\n", e.to_string().red());
                            continue;
                        }
                    };

                    match command {
                        SpecialCommand::Exit => break,
                        SpecialCommand::None => controller.send_message(trimmed).await,
                        command => {
                            let mut ask = |prompt: &str, initial: &str| {
                                rl.readline_with_initial(prompt, (initial, "")).ok()
                            };
                            handle_command(&mut controller, command, &mut ask).await;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    /// Execute one special command
    ///
    /// `Exit` and `None` are handled by the caller and ignored here.
    ///
    /// # Arguments
    ///
    /// * `controller` - Chat controller over a file document
    /// * `command` - Parsed command
    /// * `ask` - Reads follow-up input (template fields, confirmations)
    pub async fn handle_command<V: ChatView>(
        controller: &mut ChatController<FileDocument, V>,
        command: SpecialCommand,
        ask: &mut Ask<'_>,
    ) {
        match command {
            SpecialCommand::Help => print_help(),
            SpecialCommand::ShowStatus => print_status_display(controller),

            SpecialCommand::NewChat => controller.new_chat(),
            SpecialCommand::ListChats => controller.show_sessions(),
            SpecialCommand::ClearChat => controller.clear_chat(),
            SpecialCommand::SwitchChat(position) => match chat_id_at(controller, position) {
                Some(id) => controller.switch_chat(&id),
                None => controller
                    .view_mut()
                    .notify(&format!("No chat number {}", position)),
            },
            SpecialCommand::DeleteChat(position) => {
                let id = match position {
                    Some(position) => chat_id_at(controller, position),
                    None => Some(controller.sessions().current_id().to_string()),
                };
                match id {
                    Some(id) => controller.delete_chat(&id),
                    None => controller.view_mut().notify(&format!(
                        "No chat number {}",
                        position.unwrap_or_default()
                    )),
                }
            }

            SpecialCommand::ListModels => controller.show_models(),
            SpecialCommand::SwitchModel(name) => {
                controller.select_model(&name);
            }
            SpecialCommand::Retry => controller.retry_connection().await,
            SpecialCommand::MockMode => controller.use_mock_mode(),

            SpecialCommand::SelectLines { first, last } => {
                match controller.document_mut().select_lines(first, last) {
                    Ok(()) => controller.on_selection_changed().await,
                    Err(e) => controller.view_mut().notify(&e.to_string()),
                }
            }
            SpecialCommand::ClearSelection => {
                controller.document_mut().clear_selection();
                controller.view_mut().notify("Selection cleared");
            }
            SpecialCommand::ShowSelection => {
                if controller.document().selection().is_none() {
                    controller.view_mut().notify("No text selected");
                } else {
                    controller.on_selection_changed().await;
                }
            }
            SpecialCommand::UseSelection(draft) => {
                let draft = draft.unwrap_or_default();
                if let Some(message) = controller.compose_with_selection(&draft).await {
                    controller.send_message(&message).await;
                }
            }
            SpecialCommand::Apply => controller.apply_last_response().await,
            SpecialCommand::InsertChat => controller.insert_transcript().await,
            SpecialCommand::Export(path) => {
                controller.export_chat(path.as_deref());
            }

            SpecialCommand::QuickAction(action) => controller.quick_prompt(&action).await,
            SpecialCommand::ListPrompts => controller.show_templates(),
            SpecialCommand::UseTemplate(id) => controller.use_template(&id).await,
            SpecialCommand::NewPrompt => {
                if let Some(draft) = read_prompt_draft(ask, &PromptDraft::default()) {
                    controller.create_prompt(draft);
                }
            }
            SpecialCommand::EditPrompt(id) => {
                let Some(template) = controller.prompts().get(&id).cloned() else {
                    controller
                        .view_mut()
                        .notify(&format!("Prompt not found: {}", id));
                    return;
                };
                let current = PromptDraft {
                    name: template.name,
                    description: template.description,
                    category: template.category,
                    content: template.content,
                };
                if let Some(draft) = read_prompt_draft(ask, &current) {
                    controller.update_prompt(&id, draft);
                }
            }
            SpecialCommand::DeletePrompt(id) => {
                let name = controller.prompts().get(&id).map(|t| t.name.clone());
                let confirmed = match &name {
                    Some(name) => confirm(
                        ask,
                        &format!("Are you sure you want to delete the prompt \"{}\"? [y/N] ", name),
                    ),
                    // Unknown ids go straight through so the error is reported
                    None => true,
                };
                if confirmed {
                    controller.delete_prompt(&id);
                }
            }

            SpecialCommand::Exit | SpecialCommand::None => {}
        }
    }

    fn chat_id_at<V: ChatView>(
        controller: &ChatController<FileDocument, V>,
        position: usize,
    ) -> Option<String> {
        controller
            .sessions()
            .id_at(position.checked_sub(1)?)
            .map(str::to_string)
    }

    fn confirm(ask: &mut Ask<'_>, question: &str) -> bool {
        ask(question, "")
            .map(|answer| answer.trim().to_lowercase().starts_with('y'))
            .unwrap_or(false)
    }

    /// Read the four template fields; `None` if input was cancelled
    ///
    /// Content is a single line; `\n` in it becomes a line break.
    fn read_prompt_draft(ask: &mut Ask<'_>, current: &PromptDraft) -> Option<PromptDraft> {
        let name = ask("Name: ", &current.name)?;
        let description = ask("Description: ", &current.description)?;
        let category = ask("Category: ", &current.category)?;
        let content = ask(
            "Content (use {{selectedText}} for the selection): ",
            &current.content.replace('\n', "\\n"),
        )?;
        Some(PromptDraft {
            name: name.trim().to_string(),
            description: description.trim().to_string(),
            category: category.trim().to_string(),
            content: content.replace("\\n", "\n"),
        })
    }

    /// Display welcome banner at the start of interactive chat mode
    fn print_welcome_banner(document: &str) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║           DocChat Interactive Chat - Welcome!                ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Document: {}", document.cyan());
        println!("Select lines with '/select <a>-<b>', then chat or run a quick action.");
        println!("Type '/help' for available commands, 'exit' to quit\n");
    }

    /// Display status information about the current session
    fn print_status_display<V: ChatView>(controller: &ChatController<FileDocument, V>) {
        let line = controller.prompt_line();

        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                     DocChat Session Status                   ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("{}", line.status());
        println!("Chats:             {}", controller.sessions().len());
        println!(
            "Messages:          {}",
            controller.sessions().current().messages.len()
        );
        println!("Document:          {}", controller.document().describe());
        match controller.document().selection() {
            Some((first, last)) => println!("Selection:         lines {}-{}", first, last),
            None => println!("Selection:         none"),
        }
        println!("Prompt Format:     {}", line.format_colored_prompt());
        println!();
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::config::{ChatConfig, ClientConfig};
        use crate::controller::{RecordingView, ViewEvent};
        use std::collections::VecDeque;
        use tempfile::TempDir;

        fn controller(contents: &str) -> (TempDir, ChatController<FileDocument, RecordingView>) {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("doc.txt");
            std::fs::write(&path, contents).unwrap();
            let document = FileDocument::open(&path).unwrap();
            let client = ModelClient::new(&ClientConfig::default()).unwrap();
            let mut controller =
                ChatController::new(client, document, RecordingView::new(), &ChatConfig::default());
            controller.use_mock_mode();
            controller.view_mut().clear();
            (dir, controller)
        }

        fn scripted(answers: &[&str]) -> impl FnMut(&str, &str) -> Option<String> {
            let mut answers: VecDeque<String> = answers.iter().map(|a| a.to_string()).collect();
            move |_prompt: &str, _initial: &str| answers.pop_front()
        }

        #[tokio::test]
        async fn test_select_lines_shows_preview() {
            let (_dir, mut controller) = controller("alpha\nbeta\ngamma\n");
            let mut ask = scripted(&[]);
            handle_command(
                &mut controller,
                SpecialCommand::SelectLines { first: 2, last: 3 },
                &mut ask,
            )
            .await;
            assert_eq!(
                controller.view().events,
                vec![ViewEvent::Selection("beta\ngamma".to_string())]
            );
        }

        #[tokio::test]
        async fn test_select_out_of_range_notifies() {
            let (_dir, mut controller) = controller("only\n");
            let mut ask = scripted(&[]);
            handle_command(
                &mut controller,
                SpecialCommand::SelectLines { first: 2, last: 4 },
                &mut ask,
            )
            .await;
            assert_eq!(controller.view().notices().len(), 1);
            assert_eq!(controller.document().selection(), None);
        }

        #[tokio::test]
        async fn test_switch_to_missing_chat_notifies() {
            let (_dir, mut controller) = controller("x\n");
            let mut ask = scripted(&[]);
            handle_command(&mut controller, SpecialCommand::SwitchChat(5), &mut ask).await;
            assert_eq!(controller.view().notices(), vec!["No chat number 5"]);
        }

        #[tokio::test]
        async fn test_delete_chat_by_position() {
            let (_dir, mut controller) = controller("x\n");
            let mut ask = scripted(&[]);
            handle_command(&mut controller, SpecialCommand::NewChat, &mut ask).await;
            handle_command(&mut controller, SpecialCommand::NewChat, &mut ask).await;
            handle_command(&mut controller, SpecialCommand::DeleteChat(Some(2)), &mut ask).await;

            let names: Vec<&str> = controller
                .sessions()
                .sessions()
                .iter()
                .map(|s| s.name.as_str())
                .collect();
            assert_eq!(names, vec!["Chat 1", "Chat 2"]);
        }

        #[tokio::test]
        async fn test_use_selection_sends_draft_and_selection() {
            let (_dir, mut controller) = controller("first\nsecond\n");
            let mut ask = scripted(&[]);
            controller.document_mut().select_lines(1, 1).unwrap();
            handle_command(
                &mut controller,
                SpecialCommand::UseSelection(Some("Rephrase:".to_string())),
                &mut ask,
            )
            .await;
            let user = controller
                .sessions()
                .current()
                .messages
                .iter()
                .find(|m| m.kind == crate::session::MessageKind::User)
                .unwrap();
            assert_eq!(user.content, "Rephrase:\n\nfirst");
        }

        #[tokio::test]
        async fn test_apply_writes_reply_into_file() {
            let (dir, mut controller) = controller("keep\nreplace me\nkeep too\n");
            let mut ask = scripted(&[]);
            controller.document_mut().select_lines(2, 2).unwrap();
            controller.send_message("hello").await;
            handle_command(&mut controller, SpecialCommand::Apply, &mut ask).await;

            let written = std::fs::read_to_string(dir.path().join("doc.txt")).unwrap();
            assert!(written.starts_with("keep\nThis is a mock response"));
            assert!(written.ends_with("keep too\n"));
        }

        #[tokio::test]
        async fn test_new_prompt_from_answers() {
            let (_dir, mut controller) = controller("x\n");
            let mut ask = scripted(&["Shorten", "", "Editing", "Shorten:\\n{{selectedText}}"]);
            handle_command(&mut controller, SpecialCommand::NewPrompt, &mut ask).await;

            let created = controller
                .prompts()
                .list()
                .iter()
                .find(|t| t.name == "Shorten")
                .unwrap();
            assert_eq!(created.content, "Shorten:\n{{selectedText}}");
            assert!(created.id.starts_with("custom-"));
        }

        #[tokio::test]
        async fn test_cancelled_prompt_is_not_created() {
            let (_dir, mut controller) = controller("x\n");
            let mut ask = scripted(&["Half done"]);
            handle_command(&mut controller, SpecialCommand::NewPrompt, &mut ask).await;
            assert_eq!(controller.prompts().list().len(), 4);
            assert!(controller.view().notices().is_empty());
        }

        #[tokio::test]
        async fn test_delete_prompt_requires_confirmation() {
            let (_dir, mut controller) = controller("x\n");
            let mut ask = scripted(&["n", "y"]);
            let id = "general-editor".to_string();

            handle_command(&mut controller, SpecialCommand::DeletePrompt(id.clone()), &mut ask)
                .await;
            assert!(controller.prompts().get(&id).is_some());

            handle_command(&mut controller, SpecialCommand::DeletePrompt(id.clone()), &mut ask)
                .await;
            assert!(controller.prompts().get(&id).is_none());
            assert_eq!(
                controller.view().notices(),
                vec!["Prompt deleted successfully"]
            );
        }

        #[tokio::test]
        async fn test_edit_missing_prompt_notifies() {
            let (_dir, mut controller) = controller("x\n");
            let mut ask = scripted(&[]);
            handle_command(
                &mut controller,
                SpecialCommand::EditPrompt("custom-nope".to_string()),
                &mut ask,
            )
            .await;
            assert_eq!(controller.view().notices(), vec!["Prompt not found: custom-nope"]);
        }
    }
}

/// Relay command
pub mod relay {
    use crate::config::Config;
    use crate::error::Result;

    /// Run the relay until Ctrl-C
    ///
    /// # Errors
    ///
    /// Returns error if the plaintext listener cannot be started
    pub async fn run_relay(config: Config) -> Result<()> {
        tracing::info!(
            upstream = %config.relay.upstream_url,
            http_port = config.relay.http_port,
            tls = config.relay.enable_tls,
            "Starting relay"
        );
        crate::relay::run(&config.relay).await
    }
}

/// Prompt template listing
pub mod prompts {
    use crate::config::Config;
    use crate::error::{DocchatError, Result};
    use crate::prompts::{PromptLibrary, PromptTemplate};
    use prettytable::{row, Table};

    /// Print the default and configured prompt templates
    ///
    /// # Errors
    ///
    /// Returns `DocchatError::Serialization` if JSON output fails
    pub fn list_prompts(config: &Config, json: bool) -> Result<()> {
        let library = PromptLibrary::with_configured(&config.chat.prompts);
        if json {
            let json =
                serde_json::to_string_pretty(library.list()).map_err(DocchatError::Serialization)?;
            println!("{}", json);
        } else {
            output_prompts_table(library.list());
        }
        Ok(())
    }

    fn output_prompts_table(templates: &[PromptTemplate]) {
        let mut table = Table::new();
        table.add_row(row!["ID", "Name", "Category", "Description"]);
        for template in templates {
            table.add_row(row![
                template.id,
                template.name,
                template.category,
                template.description
            ]);
        }
        println!();
        table.printstd();
        println!();
    }

}
