//! Output abstraction layer
//!
//! Command output goes through [`OutputWriter`] so commands can be tested
//! with a [`BufferedWriter`] instead of stdout. Inside the finder the single
//! status line is a [`StatusMessage`].

use colored::Colorize;
use std::sync::Mutex;

/// Trait for output operations
///
/// # Examples
///
/// ```no_run
/// use zettel::ui::output::{OutputWriter, StdoutWriter};
///
/// let output = StdoutWriter::new();
/// output.write("20240101120000");
/// output.success("Index created");
/// output.error("Something went wrong");
/// ```
pub trait OutputWriter: Send + Sync {
    /// Write a normal message (command results; never suppressed)
    fn write(&self, message: &str);

    /// Write an error message
    fn error(&self, message: &str);

    /// Write a success message
    fn success(&self, message: &str);

    /// Write a warning message
    fn warning(&self, message: &str);

    /// Write an info message (dimmed/secondary)
    fn info(&self, message: &str);
}

/// CLI implementation - writes to stdout/stderr
///
/// Results go to stdout so `zk` composes in pipelines; everything else goes
/// to stderr. A quiet writer drops success, warning and info messages.
pub struct StdoutWriter {
    quiet: bool,
}

impl StdoutWriter {
    /// Create a new stdout writer
    #[must_use]
    pub const fn new() -> Self {
        Self { quiet: false }
    }

    /// Writer that only prints results and errors
    #[must_use]
    pub const fn quiet() -> Self {
        Self { quiet: true }
    }
}

impl Default for StdoutWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputWriter for StdoutWriter {
    fn write(&self, message: &str) {
        println!("{message}");
    }

    fn error(&self, message: &str) {
        eprintln!("{} {}", "error:".red().bold(), message);
    }

    fn success(&self, message: &str) {
        if !self.quiet {
            eprintln!("{} {}", "✓".green(), message);
        }
    }

    fn warning(&self, message: &str) {
        if !self.quiet {
            eprintln!("{} {}", "warning:".yellow(), message);
        }
    }

    fn info(&self, message: &str) {
        if !self.quiet {
            eprintln!("{}", message.dimmed());
        }
    }
}

/// Message level for categorizing output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    /// Normal message
    Normal,
    /// Error message
    Error,
    /// Success message
    Success,
    /// Warning message
    Warning,
    /// Info message
    Info,
}

/// Writer that keeps every message in memory
#[derive(Debug, Default)]
pub struct BufferedWriter {
    messages: Mutex<Vec<(MessageLevel, String)>>,
}

impl BufferedWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages so far, oldest first
    #[must_use]
    pub fn messages(&self) -> Vec<(MessageLevel, String)> {
        self.messages
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }

    /// Messages of one level, oldest first
    #[must_use]
    pub fn messages_at(&self, level: MessageLevel) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, message)| message)
            .collect()
    }

    fn add_message(&self, level: MessageLevel, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push((level, message.to_string()));
        }
    }
}

impl OutputWriter for BufferedWriter {
    fn write(&self, message: &str) {
        self.add_message(MessageLevel::Normal, message);
    }

    fn error(&self, message: &str) {
        self.add_message(MessageLevel::Error, message);
    }

    fn success(&self, message: &str) {
        self.add_message(MessageLevel::Success, message);
    }

    fn warning(&self, message: &str) {
        self.add_message(MessageLevel::Warning, message);
    }

    fn info(&self, message: &str) {
        self.add_message(MessageLevel::Info, message);
    }
}

/// The finder's status line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub level: MessageLevel,
    pub text: String,
}

impl StatusMessage {
    #[must_use]
    pub fn new(level: MessageLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn info(text: impl Into<String>) -> Self {
        Self::new(MessageLevel::Info, text)
    }

    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self::new(MessageLevel::Error, text)
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.level == MessageLevel::Error
    }
}
