//! Error types for script execution

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while running a script file
#[derive(Error, Debug)]
pub enum ScriptError {
    /// The script file could not be read
    #[error("Failed to read script {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Compiling or running the script failed; carries Lua's own
    /// `file:line:` diagnostic and traceback
    #[error(transparent)]
    Lua(#[from] mlua::Error),
}

/// Result type alias using ScriptError
pub type ScriptResult<T> = Result<T, ScriptError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_error_display() {
        let err = ScriptError::Read {
            path: PathBuf::from("setup.lua"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file"),
        };
        assert_eq!(err.to_string(), "Failed to read script setup.lua: No such file");
    }

    #[test]
    fn test_error_from_lua() {
        let err: ScriptError = mlua::Error::runtime("boom").into();
        assert!(matches!(err, ScriptError::Lua(_)));
        assert!(err.to_string().contains("boom"));
    }
}
