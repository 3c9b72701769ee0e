//! In-memory storage backend.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};

use super::{Storage, StorageError, StorageWrite};

#[derive(Clone, Debug)]
struct Entry {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Process-local [`Storage`] backed by a locked map.
///
/// # Thread Safety
///
/// `MemoryStorage` is `Send + Sync`. Batches are applied under a single
/// write lock, so readers never observe a partial batch.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, Entry>>,
}

// Verify MemoryStorage is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<MemoryStorage>();
};

impl MemoryStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of unexpired entries.
    #[must_use]
    pub fn len(&self) -> usize {
        let now = Utc::now();
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|e| e.expires_at > now)
            .count()
    }

    /// Returns `true` if no unexpired entry is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn apply(entries: &mut HashMap<String, Entry>, write: &StorageWrite) {
        match write {
            StorageWrite::Set { key, value, ttl } => {
                entries.insert(
                    key.clone(),
                    Entry {
                        value: value.clone(),
                        expires_at: Utc::now() + *ttl,
                    },
                );
            }
            StorageWrite::Remove { key } => {
                entries.remove(key);
            }
        }
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
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
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        for write in writes {
            Self::apply(&mut entries, write);
        }
        Ok(())
    }
}
