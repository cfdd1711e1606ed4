//! Collects the messages produced while converting a YARRRML document.
//!
//! A conversion never aborts on the first problem:
//! each issue is recorded here, and the caller decides,
//! by inspecting the [`Logger`], whether the result is usable.

use serde::Serialize;
use std::fmt;

/// Severity of a [log entry](Entry).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// The document could not be (entirely) converted.
    Error,
    /// Something was ignored or guessed.
    Warn,
    /// Informative message.
    Info,
}

impl Level {
    fn as_log_level(self) -> log::Level {
        match self {
            Level::Error => log::Level::Error,
            Level::Warn => log::Level::Warn,
            Level::Info => log::Level::Info,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let txt = match self {
            Level::Error => "error",
            Level::Warn => "warn",
            Level::Info => "info",
        };
        f.write_str(txt)
    }
}

/// A single message recorded by a [`Logger`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Entry {
    /// Severity
    pub level: Level,
    /// Human-readable description
    pub message: String,
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.message)
    }
}

/// An append-only list of [entries](Entry).
///
/// Every entry is also forwarded to the [`log`] facade.
#[derive(Clone, Debug, Default)]
pub struct Logger {
    entries: Vec<Entry>,
}

impl Logger {
    /// Build an empty logger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message with the given level.
    pub fn log<M: Into<String>>(&mut self, level: Level, message: M) {
        let message = message.into();
        log::log!(level.as_log_level(), "{message}");
        self.entries.push(Entry { level, message });
    }

    /// Record an error.
    pub fn error<M: Into<String>>(&mut self, message: M) {
        self.log(Level::Error, message)
    }

    /// Record a warning.
    pub fn warn<M: Into<String>>(&mut self, message: M) {
        self.log(Level::Warn, message)
    }

    /// Record an informative message.
    pub fn info<M: Into<String>>(&mut self, message: M) {
        self.log(Level::Info, message)
    }

    /// Whether at least one entry with the given level was recorded.
    pub fn has(&self, level: Level) -> bool {
        self.entries.iter().any(|e| e.level == level)
    }

    /// Shortcut for `self.has(Level::Error)`.
    pub fn has_errors(&self) -> bool {
        self.has(Level::Error)
    }

    /// All recorded entries, in the order they were recorded.
    pub fn get_all(&self) -> &[Entry] {
        &self.entries
    }

    /// Iterate over the entries with the given level.
    pub fn get(&self, level: Level) -> impl Iterator<Item = &Entry> + '_ {
        self.entries.iter().filter(move |e| e.level == level)
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget all recorded entries.
    pub fn clear(&mut self) {
        self.entries.clear()
    }
}
