//! Persisted boolean flags that survive across reader sessions.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("flag store io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("flag store is not valid json: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Key/value flag storage consumed by the reader.
pub trait FlagStore {
    /// Read a flag. Missing or unreadable flags are `false`.
    fn get(&self, key: &str) -> bool;

    /// Write a flag.
    fn set(&self, key: &str, value: bool) -> Result<(), StoreError>;
}

/// Flags held in memory for the life of the process.
#[derive(Debug, Default)]
pub struct MemoryFlagStore {
    flags: RefCell<BTreeMap<String, bool>>,
}

impl MemoryFlagStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl FlagStore for MemoryFlagStore {
    fn get(&self, key: &str) -> bool {
        self.flags.borrow().get(key).copied().unwrap_or(false)
    }

    fn set(&self, key: &str, value: bool) -> Result<(), StoreError> {
        self.flags.borrow_mut().insert(key.to_owned(), value);
        Ok(())
    }
}

/// Flags persisted as a JSON object in a single file.
#[derive(Debug, Clone)]
pub struct FileFlagStore {
    path: PathBuf,
}

impl FileFlagStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_all(&self) -> Result<BTreeMap<String, bool>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl FlagStore for FileFlagStore {
    fn get(&self, key: &str) -> bool {
        match self.read_all() {
            Ok(flags) => flags.get(key).copied().unwrap_or(false),
            Err(e) => {
                tracing::warn!(error = %e, path = %self.path.display(), "flag store unreadable");
                false
            }
        }
    }

    fn set(&self, key: &str, value: bool) -> Result<(), StoreError> {
        let mut flags = self.read_all()?;
        flags.insert(key.to_owned(), value);
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&flags)?)?;
        Ok(())
    }
}
