// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types.
//!
//! Transport failures carry an [`ErrorKind`], a message, the cargo path
//! that was being processed and, for imports, the row/column of the
//! offending token.

use std::fmt;

/// Classification of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A scalar rejected its lexical form.
    Lexical,
    /// Missing required entry, entry beyond its maximum, or unknown name.
    Structural,
    /// Missing or unregistered polymorphic type tag.
    TypeDiscrimination,
    /// A cargo's `validate` hook refused its content.
    Validation,
    /// The byte source or sink failed (including malformed markup).
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Lexical => write!(f, "lexical"),
            ErrorKind::Structural => write!(f, "structural"),
            ErrorKind::TypeDiscrimination => write!(f, "type discrimination"),
            ErrorKind::Validation => write!(f, "validation"),
            ErrorKind::Io => write!(f, "I/O"),
        }
    }
}

/// Failure raised by `send` / `receive`.
#[derive(Debug)]
pub struct TransportError {
    pub kind: ErrorKind,
    pub message: String,
    /// Slash-separated names from the root to the failing cargo.
    pub path: String,
    /// 1-based row; 0 when unknown (exports).
    pub row: usize,
    /// 1-based column; 0 when unknown (exports).
    pub column: usize,
    source: Option<std::io::Error>,
}

impl TransportError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            path: String::new(),
            row: 0,
            column: 0,
            source: None,
        }
    }

    pub fn structural(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Structural, message)
    }

    pub fn lexical(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Lexical, message)
    }

    pub fn discrimination(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeDiscrimination, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Malformed input reported by a parser.
    pub fn syntax(message: impl Into<String>, row: usize, column: usize) -> Self {
        Self::new(ErrorKind::Io, message).at(row, column)
    }

    /// Attach the parse position.
    pub fn at(mut self, row: usize, column: usize) -> Self {
        self.row = row;
        self.column = column;
        self
    }

    /// Attach the cargo path, keeping an inner path set deeper in the tree.
    pub fn within(mut self, path: &str) -> Self {
        if self.path.is_empty() {
            self.path = path.to_string();
        }
        self
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.kind, self.message)?;
        if !self.path.is_empty() {
            write!(f, " at {}", self.path)?;
        }
        if self.row > 0 {
            write!(f, " (row {}, column {})", self.row, self.column)?;
        }
        Ok(())
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl From<std::io::Error> for TransportError {
    fn from(e: std::io::Error) -> Self {
        Self {
            kind: ErrorKind::Io,
            message: e.to_string(),
            path: String::new(),
            row: 0,
            column: 0,
            source: Some(e),
        }
    }
}

/// Range-checked grid access on a `Setting`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingError {
    /// `(row, column)` outside `rows x columns`.
    OutOfRange {
        row: usize,
        column: usize,
        rows: usize,
        columns: usize,
    },
    /// Column count must be at least 1.
    ZeroColumns,
    /// Value count is not a multiple of the column count.
    Ragged { values: usize, columns: usize },
}

impl fmt::Display for SettingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingError::OutOfRange {
                row,
                column,
                rows,
                columns,
            } => write!(
                f,
                "Cell ({}, {}) out of range for {}x{} setting",
                row, column, rows, columns
            ),
            SettingError::ZeroColumns => write!(f, "Setting needs at least one column"),
            SettingError::Ragged { values, columns } => {
                write!(f, "{} values do not fill {} columns", values, columns)
            }
        }
    }
}

impl std::error::Error for SettingError {}

/// Publisher and transaction failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    /// A subscriber with the same identity is already registered.
    Duplicate(String),
    /// A transaction is already in progress.
    TransactionActive(String),
}

impl fmt::Display for EventError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventError::Duplicate(who) => write!(f, "Subscriber already registered: {}", who),
            EventError::TransactionActive(id) => write!(f, "Transaction already active: {}", id),
        }
    }
}

impl std::error::Error for EventError {}

/// Transport policy profile loading.
#[derive(Debug)]
pub enum ConfigError {
    /// File could not be read.
    Io(std::io::Error),
    /// Document did not parse.
    Parse(String),
    /// Requested profile is not defined.
    ProfileNotFound(String),
    /// Format not recognised from the file extension.
    UnsupportedFormat(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Failed to read policy file: {}", e),
            ConfigError::Parse(msg) => write!(f, "Failed to parse policy: {}", msg),
            ConfigError::ProfileNotFound(name) => write!(f, "Policy profile not found: {}", name),
            ConfigError::UnsupportedFormat(ext) => {
                write!(f, "Unsupported policy format: {}", ext)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

/// Crate-level error.
#[derive(Debug)]
pub enum Error {
    Transport(TransportError),
    Setting(SettingError),
    Event(EventError),
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Transport(e) => write!(f, "{}", e),
            Error::Setting(e) => write!(f, "{}", e),
            Error::Event(e) => write!(f, "{}", e),
            Error::Config(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Transport(e) => Some(e),
            Error::Setting(e) => Some(e),
            Error::Event(e) => Some(e),
            Error::Config(e) => Some(e),
        }
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Error::Transport(e)
    }
}

impl From<SettingError> for Error {
    fn from(e: SettingError) -> Self {
        Error::Setting(e)
    }
}

impl From<EventError> for Error {
    fn from(e: EventError) -> Self {
        Error::Event(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

/// Convenient alias for API results using the crate `Error` type.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_display() {
        let err = TransportError::structural("missing required entry 'id'")
            .within("shape/circle")
            .at(3, 14);
        assert_eq!(
            err.to_string(),
            "structural error: missing required entry 'id' at shape/circle (row 3, column 14)"
        );
    }

    #[test]
    fn test_inner_path_wins() {
        let err = TransportError::validation("refused").within("a/b").within("a");
        assert_eq!(err.path, "a/b");
    }

    #[test]
    fn test_io_error_has_source() {
        use std::error::Error as _;
        let err = TransportError::from(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert_eq!(err.kind, ErrorKind::Io);
        assert!(err.source().is_some());
    }
}
