//! BPLIM logging core
//!
//! Duplicates a host's standard output and standard error into a log file
//! while keeping them visible on the console.
//!
//! ## Overview
//!
//! - [`StdStreams`]: the two standard stream slots application code prints
//!   through.
//! - [`StreamTee`]: a sink that mirrors each write to the console stream and
//!   the log file, stamping standard-output writes with the time.
//! - [`RedirectingLogger`]: owns the log file and decides when the slots hold
//!   tees. At most one logger per [`LoggerRegistry`] may be open at a time.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use bplim_core::{outln, LoggerRegistry, RedirectingLogger, StdStreams};
//!
//! # fn main() -> Result<(), bplim_core::LoggerError> {
//! let streams = Arc::new(StdStreams::console());
//! let registry = Arc::new(LoggerRegistry::new());
//!
//! let mut logger = RedirectingLogger::new("analysis.log", false, registry, streams.clone())?;
//! logger.initialize()?;
//! outln!(streams, "rows loaded: {}", 1200)?;
//! logger.close()?;
//! # Ok(())
//! # }
//! ```

pub mod banner;
pub mod config;
pub mod error;
pub mod logger;
pub mod logging;
pub mod registry;
pub mod streams;
pub mod tee;

// Re-exports
pub use banner::{status_message, StatusAction};
pub use config::LoggerConfig;
pub use error::{LoggerError, LoggerResult};
pub use logger::{LoggerState, RedirectingLogger};
pub use registry::{LoggerId, LoggerRegistry};
pub use streams::{ConsoleSink, ConsoleTarget, MemorySink, SharedSink, StdStreams, TextSink};
pub use tee::{LogFile, StreamTee};
