//! Session-scoped key-value persistence.
//!
//! The only persisted fact is whether the initial splash has played. The
//! storage mechanism is injected; the policy is "absent or unreadable means
//! first visit".

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use vista_core::prelude::*;

/// Key under which the splash flag is stored
pub const DEFAULT_SESSION_KEY: &str = "vista-grande-loaded";

/// Literal value written once the splash has played
pub const COMPLETED_VALUE: &str = "true";

const SESSION_FILENAME: &str = "session.json";

/// Injected key-value capability scoped to one browsing session.
#[cfg_attr(test, mockall::automock)]
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Whether the splash already played. Errors are logged and read as `false`.
pub fn completed_initial_load(storage: &dyn SessionStorage, key: &str) -> bool {
    match storage.get(key) {
        Ok(Some(value)) => value == COMPLETED_VALUE,
        Ok(None) => false,
        Err(e) => {
            warn!("Session storage unavailable, treating as first visit: {}", e);
            false
        }
    }
}

/// Record that the splash played. Failure is logged, never raised.
pub fn mark_initial_load_completed(storage: &dyn SessionStorage, key: &str) {
    if let Err(e) = storage.set(key, COMPLETED_VALUE) {
        warn!("Failed to persist {}: {}", key, e);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// In-memory storage
// ─────────────────────────────────────────────────────────────────────────────

/// Process-local storage. Clones share the same map, so handing a clone to
/// a second store simulates a restart within the same session.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStorage {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// End the session
    pub fn clear(&self) {
        self.values.lock().clear();
    }
}

impl SessionStorage for MemorySessionStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File-backed storage
// ─────────────────────────────────────────────────────────────────────────────

/// Storage backed by a JSON object on disk, for sessions that span several
/// runs of the headless driver.
#[derive(Debug)]
pub struct FileSessionStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileSessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// `~/.local/share/vista-grande/session.json`
    pub fn default_location() -> Self {
        let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::new(base.join("vista-grande").join(SESSION_FILENAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// End the session by removing the backing file
    pub fn clear(&self) -> Result<()> {
        let _guard = self.lock.lock();
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn load(&self) -> Result<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(HashMap::new());
        }
        serde_json::from_str(&content).map_err(|e| {
            Error::storage(format!("corrupt session file {}: {}", self.path.display(), e))
        })
    }
}

impl SessionStorage for FileSessionStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock();
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock();
        let mut values = self.load().unwrap_or_else(|e| {
            warn!("Discarding unreadable session file: {}", e);
            HashMap::new()
        });
        values.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(&values)?;
        std::fs::write(&self.path, content)
            .context("Failed to write session file")?;
        debug!("Persisted {} to {}", key, self.path.display());
        Ok(())
    }
}
