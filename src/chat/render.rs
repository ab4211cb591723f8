//! Output rendering for the chat application.
//!
//! This module provides a trait-based rendering abstraction that allows
//! for different output styles. The default implementation uses ANSI
//! escape codes for styling informational and error output.

use std::io::{self, Stdout, Write};

/// ANSI escape code for dim text.
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for red text (used for errors and interrupts).
const ANSI_RED: &str = "\x1b[31m";

/// Trait for rendering chat output.
///
/// This abstraction allows for different rendering strategies:
/// - Plain text with ANSI styling
/// - Plain text without styling (for piping/redirecting)
/// - Capturing output in tests
pub trait Renderer: Send {
    /// Print a fragment of streamed response text.
    ///
    /// This is called incrementally as fragments arrive from the API.
    fn print_text(&mut self, text: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print a horizontal rule with a title, used as a section break.
    fn rule(&mut self, title: &str);

    /// Called when a response is complete.
    ///
    /// Used to ensure proper newlines and cleanup after streaming.
    fn finish_response(&mut self);

    /// Called when the stream is interrupted by the user.
    fn print_interrupted(&mut self);
}

/// Plain text renderer with optional ANSI styling.
///
/// This renderer outputs text directly to stdout with optional ANSI escape
/// codes for styling rules, errors, and interrupt notices.
pub struct PlainTextRenderer {
    stdout: Stdout,
    use_color: bool,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            use_color: true,
        }
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
        }
    }

    /// Flushes stdout to ensure immediate display of streamed content.
    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PlainTextRenderer {
    fn print_text(&mut self, text: &str) {
        print!("{text}");
        self.flush();
    }

    fn print_info(&mut self, info: &str) {
        println!("{info}");
    }

    fn print_error(&mut self, error: &str) {
        if self.use_color {
            eprintln!("\n{ANSI_RED}Error: {error}{ANSI_RESET}");
        } else {
            eprintln!("\nError: {error}");
        }
    }

    fn rule(&mut self, title: &str) {
        if self.use_color {
            println!("{ANSI_DIM}──────── {title} ────────{ANSI_RESET}");
        } else {
            println!("-------- {title} --------");
        }
    }

    fn finish_response(&mut self) {
        println!();
        self.flush();
    }

    fn print_interrupted(&mut self) {
        if self.use_color {
            println!("\n{ANSI_RED}[interrupted]{ANSI_RESET}");
        } else {
            println!("\n[interrupted]");
        }
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renderer_default_has_color() {
        let renderer = PlainTextRenderer::new();
        assert!(renderer.use_color);
    }

    #[test]
    fn renderer_without_color() {
        let renderer = PlainTextRenderer::with_color(false);
        assert!(!renderer.use_color);
    }
}
