//! Error types for the redirecting logger

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by [`RedirectingLogger`](crate::RedirectingLogger) and the
/// singleton registry.
#[derive(Error, Debug)]
pub enum LoggerError {
    /// Another logger holds the singleton slot and has not been closed
    #[error("Log '{}' currently active. Close it before creating a new one.", .0.display())]
    AlreadyOpen(PathBuf),

    /// `initialize()` was called on a logger that is not fresh
    #[error("This logger has already been initialized.")]
    AlreadyInitialized,

    /// Opening or writing the log file, or writing a console stream, failed
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl LoggerError {
    /// Path held by the conflicting logger, if this is a conflict error.
    pub fn conflicting_path(&self) -> Option<&std::path::Path> {
        match self {
            LoggerError::AlreadyOpen(path) => Some(path),
            _ => None,
        }
    }
}

/// Result type alias using LoggerError
pub type LoggerResult<T> = Result<T, LoggerError>;
