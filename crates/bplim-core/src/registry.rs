//! The singleton slot: which logger currently holds redirection rights.
//!
//! Hosts normally create one [`LoggerRegistry`] and hand it to every logger
//! they construct. [`LoggerRegistry::global`] provides a shared process-wide
//! instance for hosts that do not wire one through.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use crate::error::{LoggerError, LoggerResult};

/// Process-wide default registry
static GLOBAL_REGISTRY: OnceLock<Arc<LoggerRegistry>> = OnceLock::new();

static NEXT_LOGGER_ID: AtomicU64 = AtomicU64::new(1);

/// Identifier of a logger instance, unique within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoggerId(u64);

impl LoggerId {
    pub fn next() -> Self {
        Self(NEXT_LOGGER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug)]
struct Holder {
    id: LoggerId,
    path: PathBuf,
}

/// Registry holding at most one active logger.
#[derive(Debug, Default)]
pub struct LoggerRegistry {
    slot: Mutex<Option<Holder>>,
}

impl LoggerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry, created on first use.
    pub fn global() -> Arc<LoggerRegistry> {
        GLOBAL_REGISTRY
            .get_or_init(|| Arc::new(LoggerRegistry::new()))
            .clone()
    }

    /// Claim the slot for `id`, recording `path` as its log file.
    ///
    /// Check and claim happen under one lock. Fails with
    /// [`LoggerError::AlreadyOpen`] carrying the holder's path if the slot is
    /// taken.
    pub fn try_claim(&self, id: LoggerId, path: &Path) -> LoggerResult<()> {
        let mut slot = self.slot.lock();
        if let Some(holder) = slot.as_ref() {
            return Err(LoggerError::AlreadyOpen(holder.path.clone()));
        }
        *slot = Some(Holder {
            id,
            path: path.to_path_buf(),
        });
        tracing::debug!(path = %path.display(), "Claimed logger slot");
        Ok(())
    }

    /// Release the slot if `id` holds it. Returns whether anything was released.
    pub fn release(&self, id: LoggerId) -> bool {
        let mut slot = self.slot.lock();
        match slot.as_ref() {
            Some(holder) if holder.id == id => {
                tracing::debug!(path = %holder.path.display(), "Released logger slot");
                *slot = None;
                true
            }
            _ => false,
        }
    }

    /// Log path of the current holder, if any.
    pub fn active_path(&self) -> Option<PathBuf> {
        self.slot.lock().as_ref().map(|holder| holder.path.clone())
    }

    pub fn is_claimed(&self) -> bool {
        self.slot.lock().is_some()
    }

    /// Whether `id` is the current holder.
    pub fn is_held_by(&self, id: LoggerId) -> bool {
        matches!(self.slot.lock().as_ref(), Some(holder) if holder.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_and_release() {
        let registry = LoggerRegistry::new();
        let id = LoggerId::next();

        registry.try_claim(id, Path::new("/tmp/a.log")).unwrap();
        assert!(registry.is_claimed());
        assert!(registry.is_held_by(id));
        assert_eq!(registry.active_path(), Some(PathBuf::from("/tmp/a.log")));

        assert!(registry.release(id));
        assert!(!registry.is_claimed());
        assert_eq!(registry.active_path(), None);
    }

    #[test]
    fn test_second_claim_reports_holder_path() {
        let registry = LoggerRegistry::new();
        registry
            .try_claim(LoggerId::next(), Path::new("/tmp/first.log"))
            .unwrap();

        let err = registry
            .try_claim(LoggerId::next(), Path::new("/tmp/second.log"))
            .unwrap_err();
        assert_eq!(err.conflicting_path(), Some(Path::new("/tmp/first.log")));
    }

    #[test]
    fn test_only_holder_can_release() {
        let registry = LoggerRegistry::new();
        let holder = LoggerId::next();
        let other = LoggerId::next();

        registry.try_claim(holder, Path::new("/tmp/a.log")).unwrap();
        assert!(!registry.release(other));
        assert!(registry.is_claimed());
        assert!(registry.release(holder));
        assert!(!registry.release(holder));
    }

    #[test]
    fn test_concurrent_claims_have_one_winner() {
        let registry = Arc::new(LoggerRegistry::new());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    let path = PathBuf::from(format!("/tmp/{}.log", i));
                    registry.try_claim(LoggerId::next(), &path).is_ok()
                })
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }

    #[test]
    fn test_global_is_shared() {
        assert!(Arc::ptr_eq(&LoggerRegistry::global(), &LoggerRegistry::global()));
    }
}
