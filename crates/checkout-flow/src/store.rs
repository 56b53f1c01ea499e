//! # Durable Checkout Stores
//!
//! The quote snapshot and the retry counter live behind the explicit
//! `SnapshotStore`/`RetryStateStore` seams with two backends: an in-memory
//! store for tests and short-lived embedders, and a JSON-file store that
//! survives process restarts, so an interrupted checkout resumes with its
//! attempt accounting intact.

use checkout_core::{
    CheckoutError, CheckoutResult, QuoteSnapshot, RetryState, RetryStateStore, SnapshotStore,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// In-memory store, one checkout session per instance
#[derive(Default)]
pub struct MemoryCheckoutStore {
    snapshot: Mutex<Option<QuoteSnapshot>>,
    retry: Mutex<Option<RetryState>>,
}

impl MemoryCheckoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the quote slot, as the quote flow would before redirecting in
    pub fn with_snapshot(snapshot: QuoteSnapshot) -> Self {
        let store = Self::new();
        *store.snapshot.lock().expect("snapshot lock") = Some(snapshot);
        store
    }
}

impl SnapshotStore for MemoryCheckoutStore {
    fn load(&self) -> CheckoutResult<Option<QuoteSnapshot>> {
        Ok(self.snapshot.lock().expect("snapshot lock").clone())
    }

    fn save(&self, snapshot: &QuoteSnapshot) -> CheckoutResult<()> {
        *self.snapshot.lock().expect("snapshot lock") = Some(snapshot.clone());
        Ok(())
    }

    fn clear(&self) -> CheckoutResult<()> {
        *self.snapshot.lock().expect("snapshot lock") = None;
        Ok(())
    }
}

impl RetryStateStore for MemoryCheckoutStore {
    fn load(&self) -> CheckoutResult<RetryState> {
        Ok(self
            .retry
            .lock()
            .expect("retry lock")
            .unwrap_or_default())
    }

    fn save(&self, state: RetryState) -> CheckoutResult<()> {
        *self.retry.lock().expect("retry lock") = Some(state);
        Ok(())
    }

    fn clear(&self) -> CheckoutResult<()> {
        *self.retry.lock().expect("retry lock") = None;
        Ok(())
    }
}

/// JSON-file store keyed by checkout session.
///
/// Layout: `<dir>/<session>.quote.json` and `<dir>/<session>.retry.json`.
/// A missing file means "empty slot"; an unparsable quote file is surfaced
/// as a hard error since there is nothing to recover.
pub struct FileCheckoutStore {
    dir: PathBuf,
    session: String,
}

impl FileCheckoutStore {
    pub fn new(dir: impl Into<PathBuf>, session: impl Into<String>) -> CheckoutResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| CheckoutError::Storage(format!("create {}: {}", dir.display(), e)))?;
        Ok(Self {
            dir,
            session: session.into(),
        })
    }

    fn quote_path(&self) -> PathBuf {
        self.dir.join(format!("{}.quote.json", self.session))
    }

    fn retry_path(&self) -> PathBuf {
        self.dir.join(format!("{}.retry.json", self.session))
    }

    fn write_json<T: serde::Serialize>(&self, path: &Path, value: &T) -> CheckoutResult<()> {
        let body = serde_json::to_vec_pretty(value)
            .map_err(|e| CheckoutError::Serialization(e.to_string()))?;
        fs::write(path, body)
            .map_err(|e| CheckoutError::Storage(format!("write {}: {}", path.display(), e)))
    }

    fn remove_if_present(&self, path: &Path) -> CheckoutResult<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CheckoutError::Storage(format!(
                "remove {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

impl SnapshotStore for FileCheckoutStore {
    fn load(&self) -> CheckoutResult<Option<QuoteSnapshot>> {
        let path = self.quote_path();
        let body = match fs::read(&path) {
            Ok(body) => body,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(CheckoutError::Storage(format!(
                    "read {}: {}",
                    path.display(),
                    e
                )))
            }
        };
        let snapshot = serde_json::from_slice(&body)
            .map_err(|e| CheckoutError::Serialization(format!("quote snapshot: {}", e)))?;
        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &QuoteSnapshot) -> CheckoutResult<()> {
        self.write_json(&self.quote_path(), snapshot)
    }

    fn clear(&self) -> CheckoutResult<()> {
        self.remove_if_present(&self.quote_path())
    }
}

impl RetryStateStore for FileCheckoutStore {
    fn load(&self) -> CheckoutResult<RetryState> {
        let path = self.retry_path();
        let body = match fs::read(&path) {
            Ok(body) => body,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(RetryState::default())
            }
            Err(e) => {
                return Err(CheckoutError::Storage(format!(
                    "read {}: {}",
                    path.display(),
                    e
                )))
            }
        };
        serde_json::from_slice(&body)
            .map_err(|e| CheckoutError::Serialization(format!("retry state: {}", e)))
    }

    fn save(&self, state: RetryState) -> CheckoutResult<()> {
        self.write_json(&self.retry_path(), &state)
    }

    fn clear(&self) -> CheckoutResult<()> {
        self.remove_if_present(&self.retry_path())
    }
}
