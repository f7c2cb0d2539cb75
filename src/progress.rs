//! Human-readable progress lines on stdout.
//!
//! Status prefixes in color, errors included, on the same stream.

use std::fmt::Display;
use std::io::IsTerminal;

const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
}

impl Level {
    pub fn prefix(&self) -> &'static str {
        match self {
            Level::Info => "[INFO]",
            Level::Success => "[SUCCESS]",
            Level::Warning => "[WARNING]",
            Level::Error => "[ERROR]",
        }
    }

    fn color(&self) -> &'static str {
        match self {
            Level::Info => "\x1b[0;34m",
            Level::Success => "\x1b[0;32m",
            Level::Warning => "\x1b[1;33m",
            Level::Error => "\x1b[0;31m",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Progress {
    color: bool,
    quiet: bool,
}

impl Progress {
    pub fn new(color: bool) -> Self {
        Self {
            color,
            quiet: false,
        }
    }

    /// Color unless disabled by flag, `NO_COLOR`, or a non-terminal stdout.
    pub fn from_env(no_color: bool) -> Self {
        let color = !no_color
            && std::env::var_os("NO_COLOR").is_none()
            && std::io::stdout().is_terminal();
        Self::new(color)
    }

    /// Prints nothing. Used by tests and `--json` output.
    pub fn quiet() -> Self {
        Self {
            color: false,
            quiet: true,
        }
    }

    pub fn format_line(&self, level: Level, message: &str) -> String {
        if self.color {
            format!("{}{}{} {}", level.color(), level.prefix(), RESET, message)
        } else {
            format!("{} {}", level.prefix(), message)
        }
    }

    fn emit(&self, level: Level, message: impl Display) {
        if !self.quiet {
            println!("{}", self.format_line(level, &message.to_string()));
        }
    }

    pub fn info(&self, message: impl Display) {
        self.emit(Level::Info, message);
    }

    pub fn success(&self, message: impl Display) {
        self.emit(Level::Success, message);
    }

    pub fn warn(&self, message: impl Display) {
        self.emit(Level::Warning, message);
    }

    pub fn error(&self, message: impl Display) {
        self.emit(Level::Error, message);
    }

    /// Multi-line text printed as is.
    pub fn block(&self, text: &str) {
        if !self.quiet {
            println!("{}", text);
        }
    }

    /// Section banner between major phases.
    pub fn banner(&self, title: &str) {
        if !self.quiet {
            println!();
            println!("==== {} ====", title);
        }
    }
}
