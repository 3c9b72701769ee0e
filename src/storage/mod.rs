//! Client-side token storage.
//!
//! This module provides the key-value [`Storage`] abstraction with per-entry
//! expiry, two implementations, and the [`TokenStore`] that persists the
//! session token triple on top of it.
//!
//! # Overview
//!
//! - [`Storage`]: get / set-with-expiry / remove, plus an atomic batch write
//! - [`MemoryStorage`]: in-process map, the default for tests and short-lived tools
//! - [`FileStorage`]: JSON file on disk, the cookie-jar equivalent for CLIs
//! - [`TokenStore`]: the `accessToken` / `refreshToken` / `idToken` keys
//!
//! # Example
//!
//! ```rust
//! use console_session::storage::{MemoryStorage, TokenStore};
//! use console_session::config::TokenLifetimes;
//! use console_session::Session;
//!
//! let store = TokenStore::new(MemoryStorage::new(), TokenLifetimes::default());
//! store.save(&Session::new("access", "refresh", "id")).unwrap();
//! assert_eq!(store.id_token().as_deref(), Some("id"));
//!
//! store.clear().unwrap();
//! assert!(store.read().is_none());
//! ```

mod file;
mod memory;
mod token_store;

pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use token_store::{
    ReadySignal, StoredTokens, TokenStore, ACCESS_TOKEN_KEY, ID_TOKEN_KEY, REFRESH_TOKEN_KEY,
};

use std::fmt::Debug;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while writing to a storage medium.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing file could not be read or written.
    #[error("Storage I/O error at '{path}': {source}")]
    Io {
        /// Path of the backing file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The backing file does not contain a valid entry map.
    #[error("Storage file '{path}' is corrupt: {message}")]
    Corrupt {
        /// Path of the backing file.
        path: PathBuf,
        /// Description of the decode failure.
        message: String,
    },
}

/// A single write applied as part of [`Storage::write_batch`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageWrite {
    /// Store `value` under `key` until `ttl` elapses.
    Set {
        /// Entry key.
        key: String,
        /// Entry value.
        value: String,
        /// Time to live.
        ttl: chrono::Duration,
    },
    /// Remove `key`.
    Remove {
        /// Entry key.
        key: String,
    },
}

/// Key-value storage with per-entry expiry.
///
/// Expired entries are never returned by [`get`](Storage::get).
/// Implementations must be safe to share across tasks.
pub trait Storage: Send + Sync + Debug {
    /// Returns the value stored under `key`, if present and unexpired.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key` for `ttl`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the medium cannot be written.
    fn set(&self, key: &str, value: &str, ttl: chrono::Duration) -> Result<(), StorageError>;

    /// Removes `key`. Removing a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the medium cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Applies `writes` so that readers observe all of them or none.
    ///
    /// The default implementation applies them one at a time; implementations
    /// override it when the medium can do better.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the medium cannot be written.
    fn write_batch(&self, writes: &[StorageWrite]) -> Result<(), StorageError> {
        for write in writes {
            match write {
                StorageWrite::Set { key, value, ttl } => self.set(key, value, *ttl)?,
                StorageWrite::Remove { key } => self.remove(key)?,
            }
        }
        Ok(())
    }
}
