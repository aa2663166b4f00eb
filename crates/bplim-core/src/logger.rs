//! Single-instance logger that redirects the standard stream slots into a file.
//!
//! Lifecycle:
//!
//! ```text
//! Uninitialized --initialize--> Active <--pause/resume--> Paused
//! Active | Paused --close--> Closed
//! Uninitialized --close--> Uninitialized
//! ```
//!
//! While Active, both slots of the host's [`StdStreams`] hold [`StreamTee`]s
//! wrapping the open log file and the streams captured at construction. While
//! Paused, the captured streams are back in place and the file stays open.
//!
//! ```no_run
//! use std::sync::Arc;
//! use bplim_core::{outln, LoggerRegistry, RedirectingLogger, StdStreams};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let streams = Arc::new(StdStreams::console());
//! let mut logger =
//!     RedirectingLogger::new("run.log", false, LoggerRegistry::global(), streams.clone())?;
//!
//! logger.initialize()?;
//! outln!(streams, "captured in run.log")?;
//! logger.pause()?;
//! outln!(streams, "console only")?;
//! logger.resume()?;
//! logger.close()?;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;

use crate::banner::{status_message, StatusAction};
use crate::config::LoggerConfig;
use crate::error::{LoggerError, LoggerResult};
use crate::registry::{LoggerId, LoggerRegistry};
use crate::streams::{SharedSink, StdStreams};
use crate::tee::{LogFile, StreamTee};

/// Message printed when resuming a logger that is already on.
pub const ALREADY_ON_MESSAGE: &str = "Log file already on";

/// Message printed when pausing a logger that is already off.
pub const ALREADY_OFF_MESSAGE: &str = "Log file already off";

/// Message printed when toggling a logger that has no open file.
pub const NOT_OPEN_MESSAGE: &str = "Log file not open";

/// Lifecycle state of a [`RedirectingLogger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggerState {
    Uninitialized,
    Active,
    Paused,
    Closed,
}

/// Logger that tees a host's standard output and error into a log file.
///
/// Constructing one claims the registry's singleton slot; the slot is released
/// by [`close`](Self::close) or when the logger is dropped.
pub struct RedirectingLogger {
    id: LoggerId,
    path: PathBuf,
    append: bool,
    state: LoggerState,
    file: Option<Arc<LogFile>>,
    saved_out: SharedSink,
    saved_err: SharedSink,
    registry: Arc<LoggerRegistry>,
    streams: Arc<StdStreams>,
}

impl RedirectingLogger {
    /// Prepare a logger for `path` without opening the file.
    ///
    /// Captures the streams currently installed in `streams` so they can be
    /// restored later. Fails with [`LoggerError::AlreadyOpen`] if another logger
    /// in `registry` has not been closed.
    pub fn new(
        path: impl AsRef<Path>,
        append: bool,
        registry: Arc<LoggerRegistry>,
        streams: Arc<StdStreams>,
    ) -> LoggerResult<Self> {
        let path = std::path::absolute(path.as_ref())?;
        let id = LoggerId::next();

        registry.try_claim(id, &path)?;

        Ok(Self {
            id,
            path,
            append,
            state: LoggerState::Uninitialized,
            file: None,
            saved_out: streams.stdout(),
            saved_err: streams.stderr(),
            registry,
            streams,
        })
    }

    pub fn from_config(
        config: &LoggerConfig,
        registry: Arc<LoggerRegistry>,
        streams: Arc<StdStreams>,
    ) -> LoggerResult<Self> {
        Self::new(&config.path, config.append, registry, streams)
    }

    /// Absolute path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self) -> bool {
        self.append
    }

    pub fn state(&self) -> LoggerState {
        self.state
    }

    /// Whether output is currently being tee'd into the file.
    pub fn is_on(&self) -> bool {
        self.state == LoggerState::Active
    }

    pub fn is_closed(&self) -> bool {
        self.state == LoggerState::Closed
    }

    /// Open the log file and start redirecting.
    pub fn initialize(&mut self) -> LoggerResult<()> {
        if self.state != LoggerState::Uninitialized {
            return Err(LoggerError::AlreadyInitialized);
        }

        let file = Arc::new(LogFile::open(&self.path, self.append)?);
        self.file = Some(file.clone());

        if let Err(e) = self.write_status(StatusAction::Opened) {
            self.file = None;
            let _ = file.close();
            return Err(e);
        }

        self.redirect_streams();
        self.state = LoggerState::Active;

        tracing::info!(path = %self.path.display(), append = self.append, "Log file opened");
        Ok(())
    }

    /// Resume redirection after [`pause`](Self::pause).
    pub fn resume(&mut self) -> LoggerResult<()> {
        match self.state {
            LoggerState::Paused => {}
            LoggerState::Active => {
                self.streams.println(ALREADY_ON_MESSAGE)?;
                return Ok(());
            }
            LoggerState::Uninitialized | LoggerState::Closed => {
                tracing::warn!(state = ?self.state, "resume() on a logger without an open file");
                self.streams.println(NOT_OPEN_MESSAGE)?;
                return Ok(());
            }
        }

        self.write_status(StatusAction::Resumed)?;
        self.redirect_streams();
        self.state = LoggerState::Active;

        tracing::debug!(path = %self.path.display(), "Log file resumed");
        Ok(())
    }

    /// Stop redirecting without closing the file.
    pub fn pause(&mut self) -> LoggerResult<()> {
        match self.state {
            LoggerState::Active => {}
            LoggerState::Paused => {
                self.streams.println(ALREADY_OFF_MESSAGE)?;
                return Ok(());
            }
            LoggerState::Uninitialized | LoggerState::Closed => {
                tracing::warn!(state = ?self.state, "pause() on a logger without an open file");
                self.streams.println(NOT_OPEN_MESSAGE)?;
                return Ok(());
            }
        }

        self.write_status(StatusAction::Paused)?;
        self.restore_streams();
        self.state = LoggerState::Paused;

        tracing::debug!(path = %self.path.display(), "Log file paused");
        Ok(())
    }

    /// Alias of [`resume`](Self::resume).
    pub fn on(&mut self) -> LoggerResult<()> {
        self.resume()
    }

    /// Alias of [`pause`](Self::pause).
    pub fn off(&mut self) -> LoggerResult<()> {
        self.pause()
    }

    /// Close the log file, restore the captured streams and free the slot.
    ///
    /// Safe to call repeatedly. Does nothing on a logger that was never
    /// initialized: it stays Uninitialized and keeps the slot until dropped.
    pub fn close(&mut self) -> LoggerResult<()> {
        match self.state {
            LoggerState::Uninitialized | LoggerState::Closed => return Ok(()),
            LoggerState::Active | LoggerState::Paused => {}
        }

        let banner = self.write_status(StatusAction::Closed);
        let closed = match self.file.take() {
            Some(file) => file.close(),
            None => Ok(()),
        };
        self.restore_streams();
        self.state = LoggerState::Closed;
        self.release_slot();

        tracing::info!(path = %self.path.display(), "Log file closed");

        banner?;
        closed?;
        Ok(())
    }

    /// Write a banner to the log file (if open) and the captured stdout.
    fn write_status(&self, action: StatusAction) -> LoggerResult<()> {
        let message = status_message(action, &self.path, Local::now());

        if let Some(file) = &self.file {
            file.write_str(&message)?;
            file.flush()?;
        }
        self.saved_out.write_str(&message)?;
        self.saved_out.flush()?;
        Ok(())
    }

    fn redirect_streams(&self) {
        let Some(file) = &self.file else {
            return;
        };
        let out = StreamTee::stdout(file.clone(), self.saved_out.clone());
        let err = StreamTee::stderr(file.clone(), self.saved_err.clone());
        self.streams.replace(Arc::new(out), Arc::new(err));
    }

    fn restore_streams(&self) {
        self.streams
            .replace(self.saved_out.clone(), self.saved_err.clone());
    }

    fn release_slot(&self) {
        self.registry.release(self.id);
    }
}

impl Drop for RedirectingLogger {
    fn drop(&mut self) {
        if self.state == LoggerState::Uninitialized {
            self.release_slot();
            return;
        }
        if let Err(e) = self.close() {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to close log file on drop");
        }
    }
}

impl std::fmt::Debug for RedirectingLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedirectingLogger")
            .field("path", &self.path)
            .field("append", &self.append)
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streams::MemorySink;
    use tempfile::TempDir;

    struct Harness {
        _temp: TempDir,
        path: PathBuf,
        out: Arc<MemorySink>,
        err: Arc<MemorySink>,
        streams: Arc<StdStreams>,
        registry: Arc<LoggerRegistry>,
    }

    fn harness() -> Harness {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("run.log");
        let out = Arc::new(MemorySink::new());
        let err = Arc::new(MemorySink::new());
        let streams = Arc::new(StdStreams::new(out.clone(), err.clone()));
        Harness {
            _temp: temp,
            path,
            out,
            err,
            streams,
            registry: Arc::new(LoggerRegistry::new()),
        }
    }

    impl Harness {
        fn logger(&self) -> RedirectingLogger {
            RedirectingLogger::new(&self.path, false, self.registry.clone(), self.streams.clone())
                .unwrap()
        }

        fn log_content(&self) -> String {
            std::fs::read_to_string(&self.path).unwrap()
        }
    }

    #[test]
    fn test_new_starts_uninitialized() {
        let h = harness();
        let logger = h.logger();

        assert_eq!(logger.state(), LoggerState::Uninitialized);
        assert!(logger.path().is_absolute());
        assert!(!h.path.exists());
        assert_eq!(h.registry.active_path(), Some(logger.path().to_path_buf()));
    }

    #[test]
    fn test_initialize_writes_opened_banner() {
        let h = harness();
        let mut logger = h.logger();
        logger.initialize().unwrap();

        assert_eq!(logger.state(), LoggerState::Active);
        assert!(h.log_content().contains(" opened on:  "));
        assert!(h.out.contents().contains(" opened on:  "));
        assert!(h.err.contents().is_empty());
    }

    #[test]
    fn test_initialize_twice_fails() {
        let h = harness();
        let mut logger = h.logger();
        logger.initialize().unwrap();

        assert!(matches!(logger.initialize(), Err(LoggerError::AlreadyInitialized)));
        logger.close().unwrap();
        assert!(matches!(logger.initialize(), Err(LoggerError::AlreadyInitialized)));
    }

    #[test]
    fn test_stdout_is_timestamped_stderr_is_not() {
        let h = harness();
        let mut logger = h.logger();
        logger.initialize().unwrap();
        h.out.take();

        h.streams.print("hello").unwrap();
        h.streams.eprint("warning").unwrap();
        logger.close().unwrap();

        assert!(h.out.contents().starts_with("hello"));
        assert_eq!(h.err.contents(), "warning");

        let content = h.log_content();
        let start = content.find("hello\n[").unwrap() + "hello\n[".len();
        let ts = &content[start..start + 19];
        chrono::NaiveDateTime::parse_from_str(ts, crate::tee::TIMESTAMP_FORMAT).unwrap();
        assert!(content[start + 19..].starts_with("]\nwarning"));
    }

    #[test]
    fn test_pause_restores_and_resume_reinstalls() {
        let h = harness();
        let original = h.streams.stdout();
        let mut logger = h.logger();
        logger.initialize().unwrap();

        logger.pause().unwrap();
        assert_eq!(logger.state(), LoggerState::Paused);
        assert!(Arc::ptr_eq(&h.streams.stdout(), &original));

        h.streams.println("console only").unwrap();
        assert!(!h.log_content().contains("console only"));
        assert!(h.log_content().contains(" paused on:  "));

        logger.resume().unwrap();
        assert_eq!(logger.state(), LoggerState::Active);
        assert!(!Arc::ptr_eq(&h.streams.stdout(), &original));
        assert!(h.log_content().contains(" resumed on:  "));

        h.streams.println("logged again").unwrap();
        assert!(h.log_content().contains("logged again\n["));
    }

    #[test]
    fn test_redundant_toggles_are_noops() {
        let h = harness();
        let mut logger = h.logger();
        logger.initialize().unwrap();
        let tee = h.streams.stdout();

        logger.resume().unwrap();
        assert!(Arc::ptr_eq(&h.streams.stdout(), &tee));
        assert!(!h.log_content().contains(" resumed on:  "));
        assert!(h.out.contents().contains(ALREADY_ON_MESSAGE));

        logger.pause().unwrap();
        let before = h.log_content();
        logger.off().unwrap();
        assert_eq!(h.log_content(), before);
        assert_eq!(h.log_content().matches(" paused on:  ").count(), 1);
        assert!(h.out.contents().ends_with(&format!("{}\n", ALREADY_OFF_MESSAGE)));
    }

    #[test]
    fn test_toggle_without_file_is_tolerated() {
        let h = harness();
        let mut logger = h.logger();

        logger.pause().unwrap();
        logger.resume().unwrap();

        assert_eq!(logger.state(), LoggerState::Uninitialized);
        assert!(!h.path.exists());
        assert_eq!(h.out.contents().matches(NOT_OPEN_MESSAGE).count(), 2);
    }

    #[test]
    fn test_close_restores_original_streams() {
        let h = harness();
        let out_before = h.streams.stdout();
        let err_before = h.streams.stderr();

        let mut logger = h.logger();
        logger.initialize().unwrap();
        logger.close().unwrap();

        assert!(logger.is_closed());
        assert!(Arc::ptr_eq(&h.streams.stdout(), &out_before));
        assert!(Arc::ptr_eq(&h.streams.stderr(), &err_before));
        assert!(h.log_content().contains(" closed on:  "));
    }

    #[test]
    fn test_close_while_paused() {
        let h = harness();
        let out_before = h.streams.stdout();
        let mut logger = h.logger();
        logger.initialize().unwrap();
        logger.pause().unwrap();
        logger.close().unwrap();

        assert!(Arc::ptr_eq(&h.streams.stdout(), &out_before));
        assert!(!h.registry.is_claimed());
    }

    #[test]
    fn test_close_is_idempotent() {
        let h = harness();
        let mut logger = h.logger();
        logger.initialize().unwrap();
        logger.close().unwrap();
        let content = h.log_content();

        logger.close().unwrap();
        assert_eq!(h.log_content(), content);
        assert_eq!(content.matches(" closed on:  ").count(), 1);
    }

    #[test]
    fn test_close_uninitialized_is_noop() {
        let h = harness();
        let mut logger = h.logger();

        logger.close().unwrap();

        assert_eq!(logger.state(), LoggerState::Uninitialized);
        assert!(h.registry.is_claimed());
        assert!(!h.path.exists());
        assert!(h.out.contents().is_empty());

        logger.initialize().unwrap();
        assert!(logger.is_on());
        assert_eq!(h.log_content().matches(" opened on:  ").count(), 1);
    }

    #[test]
    fn test_drop_uninitialized_releases_slot_without_file() {
        let h = harness();
        let logger = h.logger();
        assert!(h.registry.is_claimed());

        drop(logger);

        assert!(!h.registry.is_claimed());
        assert!(!h.path.exists());
        assert!(h.out.contents().is_empty());
    }

    #[test]
    fn test_second_logger_conflicts_until_close() {
        let h = harness();
        let mut first = h.logger();
        first.initialize().unwrap();

        let other = h.path.with_file_name("other.log");
        let err = RedirectingLogger::new(&other, false, h.registry.clone(), h.streams.clone())
            .unwrap_err();
        assert_eq!(err.conflicting_path(), Some(first.path()));

        first.pause().unwrap();
        assert!(
            RedirectingLogger::new(&other, false, h.registry.clone(), h.streams.clone()).is_err()
        );

        first.close().unwrap();
        let mut second =
            RedirectingLogger::new(&other, false, h.registry.clone(), h.streams.clone()).unwrap();
        second.initialize().unwrap();
        second.close().unwrap();
    }

    #[test]
    fn test_append_mode_keeps_previous_content() {
        let h = harness();
        std::fs::write(&h.path, "previous run\n").unwrap();

        let mut logger =
            RedirectingLogger::new(&h.path, true, h.registry.clone(), h.streams.clone()).unwrap();
        logger.initialize().unwrap();
        logger.close().unwrap();
        assert!(h.log_content().starts_with("previous run\n"));

        let mut logger = h.logger();
        logger.initialize().unwrap();
        logger.close().unwrap();
        assert!(!h.log_content().contains("previous run"));
    }

    #[test]
    fn test_open_failure_propagates_io_error() {
        let h = harness();
        let missing = h.path.parent().unwrap().join("missing").join("run.log");
        let mut logger =
            RedirectingLogger::new(&missing, false, h.registry.clone(), h.streams.clone()).unwrap();

        assert!(matches!(logger.initialize(), Err(LoggerError::Io(_))));
        assert_eq!(logger.state(), LoggerState::Uninitialized);
        drop(logger);
        assert!(!h.registry.is_claimed());
    }

    #[test]
    fn test_drop_releases_slot_and_streams() {
        let h = harness();
        let out_before = h.streams.stdout();
        {
            let mut logger = h.logger();
            logger.initialize().unwrap();
        }

        assert!(!h.registry.is_claimed());
        assert!(Arc::ptr_eq(&h.streams.stdout(), &out_before));
        assert!(h.log_content().contains(" closed on:  "));
    }
}
