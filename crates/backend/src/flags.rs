//! Durable flag storage.
//!
//! One small key-value mechanism surviving restarts, used solely for the
//! demo-mode boolean. Read once at `initialize`, never polled afterwards.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

/// Key under which the demo-mode flag is persisted.
pub const DEMO_MODE_FLAG: &str = "demo_mode";

/// Boolean flags surviving process restarts.
///
/// Reads and writes are best-effort: a missing or unreadable store reads as
/// "flag not set", and write failures are logged, not surfaced.
pub trait FlagStore: Send + Sync {
    fn get(&self, key: &str) -> bool;
    fn set(&self, key: &str, value: bool);
    fn clear(&self, key: &str);
}

/// File-backed flag store (a small JSON document in the platform data
/// directory).
pub struct FileFlagStore {
    path: PathBuf,
}

impl FileFlagStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store under the conventional per-user data directory.
    pub fn in_data_dir() -> Option<Self> {
        dirs::data_dir().map(|dir| Self::new(dir.join("kaziflow").join("flags.json")))
    }

    fn load(&self) -> HashMap<String, bool> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_default(),
            Err(_) => HashMap::new(),
        }
    }

    fn store(&self, flags: &HashMap<String, bool>) {
        if let Some(parent) = self.path.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                tracing::warn!(%err, path = %parent.display(), "failed to create flag directory");
                return;
            }
        }
        match serde_json::to_string_pretty(flags) {
            Ok(raw) => {
                if let Err(err) = fs::write(&self.path, raw) {
                    tracing::warn!(%err, path = %self.path.display(), "failed to persist flags");
                }
            }
            Err(err) => tracing::warn!(%err, "failed to serialize flags"),
        }
    }
}

impl FlagStore for FileFlagStore {
    fn get(&self, key: &str) -> bool {
        self.load().get(key).copied().unwrap_or(false)
    }

    fn set(&self, key: &str, value: bool) {
        let mut flags = self.load();
        flags.insert(key.to_string(), value);
        self.store(&flags);
    }

    fn clear(&self, key: &str) {
        let mut flags = self.load();
        if flags.remove(key).is_some() {
            self.store(&flags);
        }
    }
}

/// In-memory flag store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryFlagStore {
    flags: Mutex<HashMap<String, bool>>,
}

impl FlagStore for MemoryFlagStore {
    fn get(&self, key: &str) -> bool {
        self.flags
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .copied()
            .unwrap_or(false)
    }

    fn set(&self, key: &str, value: bool) {
        self.flags
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value);
    }

    fn clear(&self, key: &str) {
        self.flags
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
    }
}
