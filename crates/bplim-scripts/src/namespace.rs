//! Shared namespace that successive scripts read and write.

use std::sync::Arc;

use bplim_core::StdStreams;
use mlua::{FromLua, IntoLua, Lua, Table, Value};

use crate::error::ScriptResult;
use crate::stdio::bind_output;

/// A Lua state plus the table scripts use as their global environment.
///
/// Globals assigned by one script are visible to every later script run
/// against the same namespace. Lua builtins stay reachable through the
/// namespace's metatable without being copied into it. `print`, `eprint`,
/// `io.write`, `io.stdout` and `io.stderr` are bound to the host's
/// [`StdStreams`], so script output follows whatever sinks are currently
/// installed there.
pub struct ScriptNamespace {
    lua: Lua,
    table: Table,
    streams: Arc<StdStreams>,
}

impl ScriptNamespace {
    /// Create an empty namespace printing through `streams`.
    pub fn new(streams: Arc<StdStreams>) -> ScriptResult<Self> {
        let lua = Lua::new();
        bind_output(&lua, &streams)?;

        let table = lua.create_table()?;
        let meta = lua.create_table()?;
        meta.set("__index", lua.globals())?;
        table.set_metatable(Some(meta));

        Ok(Self {
            lua,
            table,
            streams,
        })
    }

    pub fn lua(&self) -> &Lua {
        &self.lua
    }

    /// The namespace table itself.
    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn streams(&self) -> &Arc<StdStreams> {
        &self.streams
    }

    /// Set `name` in the namespace.
    pub fn set(&self, name: &str, value: impl IntoLua) -> ScriptResult<()> {
        self.table.raw_set(name, value)?;
        Ok(())
    }

    /// Read `name` from the namespace only (builtins are not consulted).
    pub fn get<V: FromLua>(&self, name: &str) -> ScriptResult<V> {
        Ok(self.table.raw_get(name)?)
    }

    /// Whether `name` holds a non-nil value in the namespace.
    pub fn contains(&self, name: &str) -> ScriptResult<bool> {
        let value: Value = self.table.raw_get(name)?;
        Ok(!value.is_nil())
    }

    /// Remove `name` from the namespace.
    pub fn remove(&self, name: &str) -> ScriptResult<()> {
        self.table.raw_set(name, Value::Nil)?;
        Ok(())
    }
}

impl std::fmt::Debug for ScriptNamespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptNamespace").finish_non_exhaustive()
    }
}
