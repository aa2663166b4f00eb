//! Lua standard I/O routed through the host's stream slots.
//!
//! `print`, `eprint`, `io.write`, `io.stdout` and `io.stderr` all resolve to
//! the sinks installed in a [`StdStreams`] at the moment of the write, so a
//! logger that swaps the slots captures script output without the script
//! changing. `io.output(file)` still redirects `io.write` to a real file.

use std::sync::Arc;

use bplim_core::{ConsoleTarget, SharedSink, StdStreams};
use mlua::{Function, Lua, ObjectLike, Table, Value, Variadic};

/// Registry key holding the handle `io.write` writes to.
const OUTPUT_KEY: &str = "bplim.io.output";

fn sink(streams: &StdStreams, target: ConsoleTarget) -> SharedSink {
    match target {
        ConsoleTarget::Stdout => streams.stdout(),
        ConsoleTarget::Stderr => streams.stderr(),
    }
}

/// File-like table standing in for `io.stdout` or `io.stderr`.
///
/// `write` returns the handle so calls chain, and `close` is refused the way
/// Lua refuses it for standard files.
pub fn std_handle(
    lua: &Lua,
    streams: &Arc<StdStreams>,
    target: ConsoleTarget,
) -> mlua::Result<Table> {
    let handle = lua.create_table()?;

    let out = streams.clone();
    let write_fn = lua.create_function(move |lua, (handle, args): (Table, Variadic<Value>)| {
        let text = join_values(lua, args, "")?;
        sink(&out, target)
            .write_str(&text)
            .map_err(mlua::Error::external)?;
        Ok(handle)
    })?;
    handle.set("write", write_fn)?;

    let out = streams.clone();
    let flush_fn = lua.create_function(move |_, handle: Table| {
        sink(&out, target).flush().map_err(mlua::Error::external)?;
        Ok(handle)
    })?;
    handle.set("flush", flush_fn)?;

    handle.set("setvbuf", lua.create_function(|_, _: Variadic<Value>| Ok(true))?)?;
    handle.set(
        "close",
        lua.create_function(|_, _: Variadic<Value>| {
            Ok((Value::Nil, "cannot close standard file"))
        })?,
    )?;

    let name = match target {
        ConsoleTarget::Stdout => "file (stdout)",
        ConsoleTarget::Stderr => "file (stderr)",
    };
    let meta = lua.create_table()?;
    meta.set("__tostring", lua.create_function(move |_, _: Table| Ok(name))?)?;
    handle.set_metatable(Some(meta));

    Ok(handle)
}

/// Replace the output builtins of `lua` with versions writing to `streams`.
pub fn bind_output(lua: &Lua, streams: &Arc<StdStreams>) -> mlua::Result<()> {
    let globals = lua.globals();
    let io: Table = globals.get("io")?;

    let stdout = std_handle(lua, streams, ConsoleTarget::Stdout)?;
    io.set("stdout", stdout.clone())?;
    io.set("stderr", std_handle(lua, streams, ConsoleTarget::Stderr)?)?;
    lua.set_named_registry_value(OUTPUT_KEY, stdout)?;

    // print(...): tab-separated tostring() values, then the newline
    let out = streams.clone();
    let print_fn = lua.create_function(move |lua, args: Variadic<Value>| {
        write_line(lua, &out.stdout(), args)
    })?;
    globals.set("print", print_fn)?;

    let err = streams.clone();
    let eprint_fn = lua.create_function(move |lua, args: Variadic<Value>| {
        write_line(lua, &err.stderr(), args)
    })?;
    globals.set("eprint", eprint_fn)?;

    let write_fn = lua.create_function(|lua, args: Variadic<Value>| {
        match lua.named_registry_value::<Value>(OUTPUT_KEY)? {
            Value::Table(handle) => handle.call_method::<Value>("write", args),
            Value::UserData(file) => file.call_method::<Value>("write", args),
            other => Err(mlua::Error::runtime(format!(
                "invalid output handle ({})",
                other.type_name()
            ))),
        }
    })?;
    io.set("write", write_fn)?;

    // io.output([file]): handle tables are kept as-is, names and Lua files
    // go through Lua's own io.output
    let lua_output: Function = io.get("output")?;
    let output_fn = lua.create_function(move |lua, file: Option<Value>| {
        match file {
            Some(Value::Table(handle)) => lua.set_named_registry_value(OUTPUT_KEY, handle)?,
            Some(other) => {
                let opened: Value = lua_output.call(other)?;
                lua.set_named_registry_value(OUTPUT_KEY, opened)?;
            }
            None => {}
        }
        lua.named_registry_value::<Value>(OUTPUT_KEY)
    })?;
    io.set("output", output_fn)?;

    Ok(())
}

fn write_line(lua: &Lua, sink: &SharedSink, args: Variadic<Value>) -> mlua::Result<()> {
    let line = join_values(lua, args, "\t")?;
    sink.write_str(&line).map_err(mlua::Error::external)?;
    sink.write_str("\n").map_err(mlua::Error::external)?;
    Ok(())
}

fn join_values(lua: &Lua, args: Variadic<Value>, separator: &str) -> mlua::Result<String> {
    let tostring: Function = lua.globals().get("tostring")?;
    let parts = args
        .into_iter()
        .map(|value| tostring.call::<String>(value))
        .collect::<mlua::Result<Vec<_>>>()?;
    Ok(parts.join(separator))
}
