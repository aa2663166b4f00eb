//! Script execution against a shared namespace.
//!
//! Each run compiles the file under its real path, so Lua diagnostics read
//! `path:line: message`. Identity markers reach the script through a
//! per-run environment layered over the namespace:
//!
//! - `__script__`: absolute path of the running file
//! - `__name__`: the entry name, `"__main__"` by default
//!
//! The same values are passed to the chunk as a context table
//! (`local ctx = ...` gives `ctx.script` and `ctx.name`). Every other global
//! read or write goes straight to the namespace, which never receives the
//! markers.

use std::path::{Path, PathBuf};

use mlua::Table;

use crate::error::{ScriptError, ScriptResult};
use crate::namespace::ScriptNamespace;

/// Global holding the running script's absolute path.
pub const SCRIPT_MARKER: &str = "__script__";

/// Global holding the entry name of the running script.
pub const NAME_MARKER: &str = "__name__";

/// Entry name scripts see unless configured otherwise.
pub const DEFAULT_ENTRY_NAME: &str = "__main__";

/// Identity of one script run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptContext {
    /// Absolute path of the script file
    pub script: PathBuf,

    /// Entry name exposed as `__name__`
    pub name: String,
}

/// Runs script files as if they were the program entry point.
#[derive(Debug, Clone)]
pub struct ScriptExecutor {
    entry_name: String,
}

impl Default for ScriptExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptExecutor {
    pub fn new() -> Self {
        Self {
            entry_name: DEFAULT_ENTRY_NAME.to_string(),
        }
    }

    /// Use `name` instead of `"__main__"` for `__name__`.
    pub fn with_entry_name(mut self, name: impl Into<String>) -> Self {
        self.entry_name = name.into();
        self
    }

    pub fn entry_name(&self) -> &str {
        &self.entry_name
    }

    /// Read, compile and run the script at `path` against `namespace`.
    ///
    /// Errors raised by the script are returned unchanged.
    pub fn execute(&self, path: impl AsRef<Path>, namespace: &ScriptNamespace) -> ScriptResult<()> {
        let path = path.as_ref();
        let read_error = |source| ScriptError::Read {
            path: path.to_path_buf(),
            source,
        };

        let code = std::fs::read_to_string(path).map_err(read_error)?;
        let context = ScriptContext {
            script: std::path::absolute(path).map_err(read_error)?,
            name: self.entry_name.clone(),
        };

        tracing::debug!(script = %context.script.display(), "Running script");

        let lua = namespace.lua();
        let env = self.environment(namespace, &context)?;
        let ctx = lua.create_table()?;
        ctx.set("script", context.script.to_string_lossy().into_owned())?;
        ctx.set("name", context.name.as_str())?;

        let result = lua
            .load(&code)
            .set_name(format!("@{}", path.display()))
            .set_environment(env)
            .call::<()>(ctx);

        if let Err(e) = &result {
            tracing::debug!(script = %context.script.display(), error = %e, "Script failed");
        }
        Ok(result?)
    }

    /// Run `paths` in order against one namespace, stopping at the first failure.
    pub fn execute_all<P: AsRef<Path>>(
        &self,
        paths: impl IntoIterator<Item = P>,
        namespace: &ScriptNamespace,
    ) -> ScriptResult<()> {
        for path in paths {
            self.execute(path, namespace)?;
        }
        Ok(())
    }

    /// Per-run environment: markers held locally, everything else forwarded.
    fn environment(&self, namespace: &ScriptNamespace, context: &ScriptContext) -> mlua::Result<Table> {
        let lua = namespace.lua();

        let env = lua.create_table()?;
        env.raw_set(SCRIPT_MARKER, context.script.to_string_lossy().into_owned())?;
        env.raw_set(NAME_MARKER, context.name.as_str())?;
        // `_G` names the shared namespace, not the builtins table
        env.raw_set("_G", namespace.table().clone())?;

        let meta = lua.create_table()?;
        meta.set("__index", namespace.table().clone())?;
        meta.set("__newindex", namespace.table().clone())?;

        env.set_metatable(Some(meta));
        Ok(env)
    }
}
