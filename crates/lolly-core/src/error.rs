//! Error types for the Lollypop engine.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for Lollypop operations.
pub type LollyResult<T> = Result<T, LollyError>;

/// Errors raised at the fallible edges of the engine.
///
/// Round operations never fail; an empty pool or a spent refusal is reported
/// through [`crate::Selection`] and [`crate::Refusal`] instead.
#[derive(Debug, Error)]
pub enum LollyError {
    /// A roster file could not be read.
    #[error("unable to read roster file {path}: {source}")]
    Import {
        /// The file that failed to load.
        path: PathBuf,
        /// The underlying I/O failure.
        source: std::io::Error,
    },

    /// Input contained no usable names.
    #[error("no names detected. Paste or upload a roster.")]
    NoNames,

    /// No student matched the given name.
    #[error("student not found: {0}")]
    StudentNotFound(String),

    /// No saved class list matched the given id or name.
    #[error("class list not found: {0}")]
    ClassListNotFound(String),

    /// Session was started without a class-list store.
    #[error("no class-list store configured")]
    NoClassStore,

    /// Invalid choice or input.
    #[error("invalid choice: {0}")]
    InvalidChoice(String),

    /// Unknown command.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// Class-list store I/O failure.
    #[error("class-list store: {0}")]
    Io(#[from] std::io::Error),

    /// Class-list store could not be serialized.
    #[error("class-list store: {0}")]
    Json(#[from] serde_json::Error),
}
