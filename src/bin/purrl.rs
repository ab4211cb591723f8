//! Interactive chat application for conversing with OpenAI models.
//!
//! This binary provides a streaming REPL interface for chatting with the
//! chat completions API.
//!
//! # Usage
//!
//! ```bash
//! # Basic usage with default settings
//! purrl chat
//!
//! # Specify a model
//! purrl chat --model gpt-4-turbo
//!
//! # Disable colors (useful for piping output)
//! purrl chat --no-color
//! ```
//!
//! # Commands
//!
//! Input submits with alt-enter; a plain enter inserts a newline unless the
//! line starts with the `\` escape character. While chatting:
//! - `\h` / `\help` - Show available commands
//! - `\m` / `\model` - Toggle model
//! - `\c` / `\copy` - Copy the last response to the clipboard
//! - `\cc` / `\code-copy` - Copy the last code block to the clipboard
//! - `\d` / `\dump` - Dump the conversation raw
//! - `\r` / `\reset` - Start a new chat context
//! - `\q` / `\quit` - Exit the application

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arrrg::CommandLine;
use rustyline::error::ReadlineError;
use rustyline::{
    Cmd, ConditionalEventHandler, DefaultEditor, Event, EventContext, EventHandler, KeyCode,
    KeyEvent, Modifiers, RepeatCount,
};

use purrl::OpenAi;
use purrl::chat::{
    ChatArgs, ChatConfig, ChatSession, CommandOutcome, PlainTextRenderer, Renderer,
    SystemClipboard, execute_command, lookup,
};

const USAGE: &str = "purrl chat [OPTIONS]";

/// Escape character that marks a line as a command.
const ESCAPE: char = '\\';

/// Makes a plain enter insert a newline unless the line is a command.
///
/// Commands are single-line by construction, so a leading escape character
/// submits immediately; everything else keeps accumulating until alt-enter.
struct EnterHandler;

impl ConditionalEventHandler for EnterHandler {
    fn handle(
        &self,
        _: &Event,
        _: RepeatCount,
        _: bool,
        ctx: &EventContext,
    ) -> Option<Cmd> {
        if ctx.line().starts_with(ESCAPE) {
            Some(Cmd::AcceptLine)
        } else {
            Some(Cmd::Newline)
        }
    }
}

/// Main entry point for the purrl application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, free) = ChatArgs::from_command_line_relaxed(USAGE);
    if free.first().map(String::as_str) != Some("chat") || free.len() != 1 {
        eprintln!("USAGE: {USAGE}");
        std::process::exit(1);
    }
    let config = ChatConfig::try_from(args)?;
    let use_color = config.use_color;

    let client = OpenAi::new(None)?;
    let mut session = ChatSession::new(client, config);
    let mut renderer = PlainTextRenderer::with_color(use_color);
    let mut clipboard = SystemClipboard::new();

    let mut rl = DefaultEditor::new()?;
    rl.bind_sequence(
        KeyEvent(KeyCode::Enter, Modifiers::NONE),
        EventHandler::Conditional(Box::new(EnterHandler)),
    );
    rl.bind_sequence(
        KeyEvent(KeyCode::Enter, Modifiers::ALT),
        EventHandler::Simple(Cmd::AcceptLine),
    );

    // Flag for interrupt handling during streaming
    let interrupted = Arc::new(AtomicBool::new(false));
    let interrupted_clone = interrupted.clone();
    ctrlc::set_handler(move || {
        interrupted_clone.store(true, Ordering::Relaxed);
    })?;

    println!("purrl (model: {})", session.model());
    println!("Type \\h for help, \\q to quit; alt-enter submits\n");

    loop {
        // Reset interrupt flag before each input
        interrupted.store(false, Ordering::Relaxed);

        let readline = rl.readline("> ");

        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                if let Some(trigger) = line.strip_prefix(ESCAPE) {
                    match lookup(trigger.trim()) {
                        Some(command) => {
                            let outcome = execute_command(
                                &mut session,
                                &mut renderer,
                                &mut clipboard,
                                command,
                            );
                            if outcome == CommandOutcome::Quit {
                                println!("Goodbye!");
                                break;
                            }
                        }
                        None => {
                            renderer.print_info(&format!("Unknown command: {}", trigger.trim()));
                        }
                    }
                    continue;
                }

                // Regular message - send to API
                if let Err(e) = session
                    .send_streaming(line, &mut renderer, &interrupted)
                    .await
                {
                    renderer.print_error(&e.to_string());
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt - soft interrupt
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    Ok(())
}
