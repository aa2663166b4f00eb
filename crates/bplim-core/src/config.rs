//! Logger configuration from code or the environment.

use std::path::PathBuf;

/// Environment variable naming the log file.
pub const LOG_FILE_ENV: &str = "BPLIM_LOG_FILE";

/// Environment variable enabling append mode (`1`, `true`, `yes`, `on`).
pub const LOG_APPEND_ENV: &str = "BPLIM_LOG_APPEND";

/// Construction parameters of a [`RedirectingLogger`](crate::RedirectingLogger).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    /// Log file path, relative paths resolve against the working directory
    pub path: PathBuf,

    /// Append to an existing file instead of overwriting it
    pub append: bool,
}

impl LoggerConfig {
    /// Overwrite-mode configuration for `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            append: false,
        }
    }

    pub fn with_append(mut self, append: bool) -> Self {
        self.append = append;
        self
    }

    /// Read `BPLIM_LOG_FILE` / `BPLIM_LOG_APPEND`. `None` if no file is set.
    pub fn from_env() -> Option<Self> {
        Self::from_values(
            std::env::var(LOG_FILE_ENV).ok(),
            std::env::var(LOG_APPEND_ENV).ok(),
        )
    }

    fn from_values(file: Option<String>, append: Option<String>) -> Option<Self> {
        let file = file.filter(|f| !f.trim().is_empty())?;
        let append = append.as_deref().map(parse_flag).unwrap_or(false);
        Some(Self::new(file).with_append(append))
    }
}

/// Interpret an environment flag value.
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
