//! File-backed storage, persisted as a JSON entry map.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Storage, StorageError, StorageWrite};

#[derive(Clone, Debug, Serialize, Deserialize)]
struct FileEntry {
    value: String,
    expires_at: DateTime<Utc>,
}

/// [`Storage`] persisted to a single JSON file.
///
/// The whole map is rewritten through a temporary file and renamed into
/// place, so a crash mid-write leaves the previous contents intact. Expired
/// entries are dropped on every write.
///
/// # Example
///
/// ```rust,no_run
/// use console_session::storage::{FileStorage, Storage};
///
/// let storage = FileStorage::open("/tmp/console-session.json").unwrap();
/// storage.set("idToken", "eyJ...", chrono::Duration::days(1)).unwrap();
/// ```
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<HashMap<String, FileEntry>>,
}

// Verify FileStorage is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<FileStorage>();
};

impl FileStorage {
    /// Opens the store at `path`, loading existing entries if the file exists.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the file exists but cannot be read, or
    /// [`StorageError::Corrupt`] if it is not a valid entry map.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => HashMap::new(),
            Ok(contents) => {
                serde_json::from_str(&contents).map_err(|e| StorageError::Corrupt {
                    path: path.clone(),
                    message: e.to_string(),
                })?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(source) => return Err(StorageError::Io { path, source }),
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Returns the path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &HashMap<String, FileEntry>) -> Result<(), StorageError> {
        let io_error = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };

        let json = serde_json::to_string_pretty(entries).map_err(|e| StorageError::Corrupt {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }

        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json).map_err(io_error)?;
        std::fs::rename(&tmp, &self.path).map_err(io_error)
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(key)
            .filter(|e| e.expires_at > Utc::now())
            .map(|e| e.value.clone())
    }

    fn set(&self, key: &str, value: &str, ttl: chrono::Duration) -> Result<(), StorageError> {
        self.write_batch(&[StorageWrite::Set {
            key: key.to_string(),
            value: value.to_string(),
            ttl,
        }])
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.write_batch(&[StorageWrite::Remove {
            key: key.to_string(),
        }])
    }

    fn write_batch(&self, writes: &[StorageWrite]) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        let mut next = entries.clone();
        let now = Utc::now();
        next.retain(|_, e| e.expires_at > now);
        for write in writes {
            match write {
                StorageWrite::Set { key, value, ttl } => {
                    next.insert(
                        key.clone(),
                        FileEntry {
                            value: value.clone(),
                            expires_at: now + *ttl,
                        },
                    );
                }
                StorageWrite::Remove { key } => {
                    next.remove(key);
                }
            }
        }

        // Memory only changes once the file is on disk.
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }
}
