//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling chat behavior.

use arrrg_derive::CommandLine;

use crate::error::{Error, Result};
use crate::types::Model;

/// Command-line arguments for the purrl chat subcommand.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Model to use for chat.
    #[arrrg(optional, "Model to use (default: gpt-4o)", "MODEL")]
    pub model: Option<String>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,

    /// Keep partially streamed responses that were interrupted mid-stream.
    #[arrrg(flag, "Keep partial responses interrupted mid-stream")]
    pub keep_partial: bool,
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// The model to use for generating responses.
    pub model: Model,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,

    /// Whether an interrupted turn keeps the partially streamed assistant
    /// message in history. Off by default: the partial buffer is discarded.
    pub keep_partial_on_interrupt: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Model: gpt-4o
    /// - Color: enabled
    /// - Interrupted partial responses: discarded
    pub fn new() -> Self {
        Self {
            model: Model::default(),
            use_color: true,
            keep_partial_on_interrupt: false,
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Sets whether interrupted turns keep their partial response.
    pub fn with_keep_partial(mut self, keep: bool) -> Self {
        self.keep_partial_on_interrupt = keep;
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<ChatArgs> for ChatConfig {
    type Error = Error;

    fn try_from(args: ChatArgs) -> Result<Self> {
        let model = match args.model {
            Some(name) => name.parse::<Model>()?,
            None => Model::default(),
        };

        Ok(ChatConfig {
            model,
            use_color: !args.no_color,
            keep_partial_on_interrupt: args.keep_partial,
        })
    }
}
