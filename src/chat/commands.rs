//! Backslash command handling for the chat application.
//!
//! Commands are declared in a static table rather than derived at runtime,
//! so trigger uniqueness is guaranteed by construction and verified by test.
//! Lookup is exact string match against the text the user typed immediately
//! after the `\` escape character.

use crate::chat::clipboard::Clipboard;
use crate::chat::render::Renderer;
use crate::chat::session::{ChatSession, CompletionTransport};
use crate::markdown::extract_code_blocks;
use crate::observability::CHAT_COMMANDS;

/// A chat command.
///
/// These commands control the chat session and are never sent to the API.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Print every registered command.
    Help,

    /// Advance to the next model in the allow-list.
    Model,

    /// Copy the last conversation message to the clipboard.
    Copy,

    /// Copy the last code block of the last message to the clipboard.
    CodeCopy,

    /// Print the whole conversation raw, role-tagged.
    Dump,

    /// Reinitialize the conversation to just the system prompt.
    Reset,

    /// Exit the chat application.
    Quit,
}

/// One entry of the command registry.
pub struct CommandSpec {
    /// The short trigger, formed from the initials of the command name.
    pub trigger: &'static str,

    /// The long alias, the dash-joined command name.
    pub long: &'static str,

    /// Display name shown in help output.
    pub name: &'static str,

    /// One-line help text.
    pub help: &'static str,

    /// The command this entry dispatches to.
    pub command: ChatCommand,
}

/// The command registry, fixed at compile time.
pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        trigger: "h",
        long: "help",
        name: "Help",
        help: "Show this help",
        command: ChatCommand::Help,
    },
    CommandSpec {
        trigger: "m",
        long: "model",
        name: "Model",
        help: "Toggle model",
        command: ChatCommand::Model,
    },
    CommandSpec {
        trigger: "c",
        long: "copy",
        name: "Copy",
        help: "Copy the last response to the clipboard",
        command: ChatCommand::Copy,
    },
    CommandSpec {
        trigger: "cc",
        long: "code-copy",
        name: "Code copy",
        help: "Copy the last code block to the clipboard",
        command: ChatCommand::CodeCopy,
    },
    CommandSpec {
        trigger: "d",
        long: "dump",
        name: "Dump",
        help: "Dump the conversation to screen raw with no formatting",
        command: ChatCommand::Dump,
    },
    CommandSpec {
        trigger: "r",
        long: "reset",
        name: "Reset",
        help: "Start a new chat context",
        command: ChatCommand::Reset,
    },
    CommandSpec {
        trigger: "q",
        long: "quit",
        name: "Quit",
        help: "Quit the application",
        command: ChatCommand::Quit,
    },
];

/// Looks up a command by exact match against its trigger or long alias.
///
/// Returns `None` for unknown triggers; the caller reports the unknown
/// command and the session continues untouched.
pub fn lookup(trigger: &str) -> Option<ChatCommand> {
    COMMANDS
        .iter()
        .find(|spec| spec.trigger == trigger || spec.long == trigger)
        .map(|spec| spec.command)
}

/// Returns help text listing every registered command.
pub fn help_text() -> String {
    let mut out = String::from("Available commands:\n");
    for spec in COMMANDS {
        out.push_str(&format!(
            "  \\{:<3} \\{:<10} {}: {}\n",
            spec.trigger, spec.long, spec.name, spec.help
        ));
    }
    out
}

/// What the session loop should do after a command.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Return to awaiting input.
    Continue,

    /// Terminate the session.
    Quit,
}

/// Executes a command against the session, renderer, and clipboard.
///
/// Every command is best-effort: failures are reported through the renderer
/// and never abort the session.
pub fn execute_command<T, C>(
    session: &mut ChatSession<T>,
    renderer: &mut dyn Renderer,
    clipboard: &mut C,
    command: ChatCommand,
) -> CommandOutcome
where
    T: CompletionTransport,
    C: Clipboard + ?Sized,
{
    CHAT_COMMANDS.click();
    match command {
        ChatCommand::Help => {
            for line in help_text().lines() {
                renderer.print_info(line);
            }
        }
        ChatCommand::Model => {
            let model = session.cycle_model();
            renderer.print_info(&format!("Model switched to {model}"));
        }
        ChatCommand::Copy => {
            let content = session.last_message().content.clone();
            match clipboard.set_text(&content) {
                Ok(()) => renderer.print_info("Copied last message to clipboard"),
                Err(err) => renderer.print_error(&err.to_string()),
            }
        }
        ChatCommand::CodeCopy => {
            let blocks = extract_code_blocks(&session.last_message().content);
            match blocks.last() {
                Some(block) => match clipboard.set_text(block) {
                    Ok(()) => renderer.print_info("Copied last code block to clipboard"),
                    Err(err) => renderer.print_error(&err.to_string()),
                },
                None => renderer.print_info("No code blocks found in last message"),
            }
        }
        ChatCommand::Dump => {
            for message in session.history() {
                renderer.print_info(&format!(
                    "<{role}>\n{content}\n</{role}>",
                    role = message.role,
                    content = message.content
                ));
            }
        }
        ChatCommand::Reset => {
            renderer.rule("Reset");
            session.reset();
        }
        ChatCommand::Quit => return CommandOutcome::Quit,
    }
    CommandOutcome::Continue
}
