//! Chat application module for interactive streaming conversations.
//!
//! This module provides a streaming REPL chat interface built on top of the
//! purrl client library. It supports:
//!
//! - Streaming responses with real-time fragment display
//! - Backslash commands for session control
//! - Clipboard export of responses and code blocks
//!
//! # Architecture
//!
//! The module is organized into several components:
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`session`]: Core chat session management and API interaction
//! - [`commands`]: Backslash command lookup and execution
//! - [`render`]: Terminal output rendering
//! - [`clipboard`]: System clipboard access

mod clipboard;
mod commands;
mod config;
mod render;
mod session;

pub use clipboard::{Clipboard, SystemClipboard};
pub use commands::{
    COMMANDS, ChatCommand, CommandOutcome, CommandSpec, execute_command, help_text, lookup,
};
pub use config::{ChatArgs, ChatConfig};
pub use render::{PlainTextRenderer, Renderer};
pub use session::{ChatSession, CompletionTransport, FragmentStream};
