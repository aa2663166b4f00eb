//! Script runner for BPLIM workflows
//!
//! Runs Lua script files one after another against a shared
//! [`ScriptNamespace`], so a sequence of scripts behaves as if it were one
//! concatenated program. Script output is printed through the host's
//! [`StdStreams`](bplim_core::StdStreams), which lets a
//! [`RedirectingLogger`](bplim_core::RedirectingLogger) capture it.

pub mod error;
pub mod executor;
pub mod namespace;
pub mod stdio;

pub use error::{ScriptError, ScriptResult};
pub use executor::{ScriptContext, ScriptExecutor, DEFAULT_ENTRY_NAME, NAME_MARKER, SCRIPT_MARKER};
pub use namespace::ScriptNamespace;
pub use stdio::std_handle;
