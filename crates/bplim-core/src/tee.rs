//! Tee sinks that mirror console writes into the log file.
//!
//! A [`StreamTee`] passes every write through to the original console stream
//! unchanged and appends a copy to the shared [`LogFile`], flushing the file on
//! each call. The standard-output tee decorates non-blank writes with a
//! bracketed timestamp in the file copy only.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Local};
use parking_lot::Mutex;

use crate::streams::{SharedSink, TextSink};

/// Format used for timestamps injected after standard-output writes.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Shared handle to an open log file.
///
/// Both tees of a logger hold the same `Arc<LogFile>`. Closing it releases the
/// underlying file even while tees still reference the handle; later writes
/// fail with [`io::ErrorKind::BrokenPipe`].
#[derive(Debug)]
pub struct LogFile {
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl LogFile {
    /// Open `path` for writing, appending or truncating per `append`.
    pub fn open(path: impl AsRef<Path>, append: bool) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();

        let mut options = OpenOptions::new();
        options.create(true);
        if append {
            options.append(true);
        } else {
            options.write(true).truncate(true);
        }
        let file = options.open(&path)?;

        Ok(Self {
            path,
            file: Mutex::new(Some(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_closed(&self) -> bool {
        self.file.lock().is_none()
    }

    pub fn write_str(&self, text: &str) -> io::Result<()> {
        match self.file.lock().as_mut() {
            Some(file) => file.write_all(text.as_bytes()),
            None => Err(closed_error()),
        }
    }

    pub fn flush(&self) -> io::Result<()> {
        match self.file.lock().as_mut() {
            Some(file) => file.flush(),
            None => Err(closed_error()),
        }
    }

    /// Flush and drop the file handle. Closing twice is a no-op.
    pub fn close(&self) -> io::Result<()> {
        match self.file.lock().take() {
            Some(mut file) => file.flush(),
            None => Ok(()),
        }
    }
}

fn closed_error() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "log file is closed")
}

/// Decorate `text` with a bracketed timestamp on its own line.
///
/// Empty or whitespace-only text is returned unchanged.
pub fn stamp(text: &str, now: DateTime<Local>) -> String {
    if text.trim().is_empty() {
        return text.to_string();
    }
    format!("{}\n[{}]\n", text, now.format(TIMESTAMP_FORMAT))
}

/// Sink that duplicates writes to the log file and an original console stream.
pub struct StreamTee {
    sink: Arc<LogFile>,
    passthrough: SharedSink,
    add_timestamp: bool,
}

impl StreamTee {
    pub fn new(sink: Arc<LogFile>, passthrough: SharedSink, add_timestamp: bool) -> Self {
        Self {
            sink,
            passthrough,
            add_timestamp,
        }
    }

    /// Tee for standard output: file copies carry timestamps.
    pub fn stdout(sink: Arc<LogFile>, passthrough: SharedSink) -> Self {
        Self::new(sink, passthrough, true)
    }

    /// Tee for standard error: file copies are verbatim.
    pub fn stderr(sink: Arc<LogFile>, passthrough: SharedSink) -> Self {
        Self::new(sink, passthrough, false)
    }

    pub fn adds_timestamp(&self) -> bool {
        self.add_timestamp
    }

    pub fn passthrough(&self) -> &SharedSink {
        &self.passthrough
    }
}

impl TextSink for StreamTee {
    fn write_str(&self, text: &str) -> io::Result<()> {
        self.passthrough.write_str(text)?;

        if self.add_timestamp {
            self.sink.write_str(&stamp(text, Local::now()))?;
        } else {
            self.sink.write_str(text)?;
        }
        self.sink.flush()
    }

    fn flush(&self) -> io::Result<()> {
        self.sink.flush()?;
        self.passthrough.flush()
    }
}

impl std::fmt::Debug for StreamTee {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamTee")
            .field("log", &self.sink.path())
            .field("add_timestamp", &self.add_timestamp)
            .finish()
    }
}
