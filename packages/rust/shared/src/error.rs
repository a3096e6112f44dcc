//! Error types for classgrab.
//!
//! Library crates use [`ClassgrabError`] via `thiserror`.
//! The CLI binary wraps this with `color-eyre` for rich diagnostics.
//!
//! Note that the HTML parsers themselves never return errors: a missing
//! table, tab, cell, or regex match is represented as an absent/empty value.
//! Errors exist only at real boundaries — config loading, selector
//! compilation, HTTP transport, and file I/O.

use std::path::PathBuf;

/// Top-level error type for all classgrab operations.
#[derive(Debug, thiserror::Error)]
pub enum ClassgrabError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while fetching a portal page.
    #[error("network error: {0}")]
    Network(String),

    /// A structural selector or pattern from config failed to compile.
    #[error("selector error: {0}")]
    Selector(String),

    /// Input that cannot be interpreted at all (e.g. an unparsable URL).
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ClassgrabError>;

impl ClassgrabError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
