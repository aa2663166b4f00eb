//! Standard stream slots.
//!
//! Application code prints through a [`StdStreams`] instead of the process-wide
//! `stdout`/`stderr`. A logger redirects output by swapping the sinks held in
//! the two slots; call sites never change.
//!
//! ```
//! use std::sync::Arc;
//! use bplim_core::{outln, MemorySink, StdStreams};
//!
//! let out = Arc::new(MemorySink::new());
//! let streams = StdStreams::new(out.clone(), Arc::new(MemorySink::new()));
//!
//! outln!(streams, "answer = {}", 42).unwrap();
//! assert_eq!(out.contents(), "answer = 42\n");
//! ```

use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

/// A text destination that can be shared between owners.
///
/// Methods take `&self`; implementations synchronize internally so a sink can
/// sit behind an `Arc` in several places at once.
pub trait TextSink: Send + Sync {
    /// Write `text` as-is.
    fn write_str(&self, text: &str) -> io::Result<()>;

    /// Flush anything buffered by the underlying destination.
    fn flush(&self) -> io::Result<()>;
}

/// Shared, dynamically typed sink as stored in a stream slot.
pub type SharedSink = Arc<dyn TextSink>;

/// Which console stream a [`ConsoleSink`] writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleTarget {
    Stdout,
    Stderr,
}

/// Sink bound to the real process console.
#[derive(Debug)]
pub struct ConsoleSink {
    target: ConsoleTarget,
}

impl ConsoleSink {
    pub fn stdout() -> Self {
        Self {
            target: ConsoleTarget::Stdout,
        }
    }

    pub fn stderr() -> Self {
        Self {
            target: ConsoleTarget::Stderr,
        }
    }

    pub fn target(&self) -> ConsoleTarget {
        self.target
    }
}

impl TextSink for ConsoleSink {
    fn write_str(&self, text: &str) -> io::Result<()> {
        match self.target {
            ConsoleTarget::Stdout => io::stdout().lock().write_all(text.as_bytes()),
            ConsoleTarget::Stderr => io::stderr().lock().write_all(text.as_bytes()),
        }
    }

    fn flush(&self) -> io::Result<()> {
        match self.target {
            ConsoleTarget::Stdout => io::stdout().lock().flush(),
            ConsoleTarget::Stderr => io::stderr().lock().flush(),
        }
    }
}

/// Sink that accumulates everything written to it in memory.
///
/// Useful for capturing console output in tests, or for hosts that want to
/// inspect what a run printed.
#[derive(Debug, Default)]
pub struct MemorySink {
    buffer: Mutex<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything written so far.
    pub fn contents(&self) -> String {
        self.buffer.lock().clone()
    }

    /// Take the accumulated text, leaving the buffer empty.
    pub fn take(&self) -> String {
        std::mem::take(&mut *self.buffer.lock())
    }
}

impl TextSink for MemorySink {
    fn write_str(&self, text: &str) -> io::Result<()> {
        self.buffer.lock().push_str(text);
        Ok(())
    }

    fn flush(&self) -> io::Result<()> {
        Ok(())
    }
}

struct Slots {
    out: SharedSink,
    err: SharedSink,
}

/// The standard output and standard error slots of a host.
pub struct StdStreams {
    slots: RwLock<Slots>,
}

impl StdStreams {
    /// Create slots bound to the given sinks.
    pub fn new(out: SharedSink, err: SharedSink) -> Self {
        Self {
            slots: RwLock::new(Slots { out, err }),
        }
    }

    /// Create slots bound to the process console.
    pub fn console() -> Self {
        Self::new(Arc::new(ConsoleSink::stdout()), Arc::new(ConsoleSink::stderr()))
    }

    /// Sink currently installed as standard output.
    pub fn stdout(&self) -> SharedSink {
        self.slots.read().out.clone()
    }

    /// Sink currently installed as standard error.
    pub fn stderr(&self) -> SharedSink {
        self.slots.read().err.clone()
    }

    /// Install `sink` as standard output, returning the previous one.
    pub fn set_stdout(&self, sink: SharedSink) -> SharedSink {
        std::mem::replace(&mut self.slots.write().out, sink)
    }

    /// Install `sink` as standard error, returning the previous one.
    pub fn set_stderr(&self, sink: SharedSink) -> SharedSink {
        std::mem::replace(&mut self.slots.write().err, sink)
    }

    /// Swap both slots at once, returning the previous `(out, err)` pair.
    pub fn replace(&self, out: SharedSink, err: SharedSink) -> (SharedSink, SharedSink) {
        let mut slots = self.slots.write();
        let old_out = std::mem::replace(&mut slots.out, out);
        let old_err = std::mem::replace(&mut slots.err, err);
        (old_out, old_err)
    }

    pub fn print(&self, text: &str) -> io::Result<()> {
        self.stdout().write_str(text)
    }

    /// Print `text` followed by a newline.
    ///
    /// The line and its terminator are two separate writes.
    pub fn println(&self, text: &str) -> io::Result<()> {
        let out = self.stdout();
        out.write_str(text)?;
        out.write_str("\n")
    }

    pub fn eprint(&self, text: &str) -> io::Result<()> {
        self.stderr().write_str(text)
    }

    /// Print `text` followed by a newline on standard error.
    pub fn eprintln(&self, text: &str) -> io::Result<()> {
        let err = self.stderr();
        err.write_str(text)?;
        err.write_str("\n")
    }

    /// Flush both slots.
    pub fn flush(&self) -> io::Result<()> {
        let (out, err) = {
            let slots = self.slots.read();
            (slots.out.clone(), slots.err.clone())
        };
        out.flush()?;
        err.flush()
    }
}

impl std::fmt::Debug for StdStreams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StdStreams").finish_non_exhaustive()
    }
}

/// Print a formatted line to the standard output slot of a [`StdStreams`].
#[macro_export]
macro_rules! outln {
    ($streams:expr) => {
        $streams.println("")
    };
    ($streams:expr, $($arg:tt)*) => {
        $streams.println(&format!($($arg)*))
    };
}

/// Print a formatted line to the standard error slot of a [`StdStreams`].
#[macro_export]
macro_rules! errln {
    ($streams:expr) => {
        $streams.eprintln("")
    };
    ($streams:expr, $($arg:tt)*) => {
        $streams.eprintln(&format!($($arg)*))
    };
}
