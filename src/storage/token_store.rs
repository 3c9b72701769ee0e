//! Persistence of the session token triple.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

use super::{Storage, StorageError, StorageWrite};
use crate::auth::session::token_is_live;
use crate::auth::Session;
use crate::config::TokenLifetimes;

/// Storage key of the access token.
pub const ACCESS_TOKEN_KEY: &str = "accessToken";
/// Storage key of the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
/// Storage key of the ID token.
pub const ID_TOKEN_KEY: &str = "idToken";

/// Whatever subset of the token triple is currently stored.
///
/// Each token expires independently, so any combination can be observed.
/// A missing ID token means "no session" even when the others remain.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct StoredTokens {
    /// The access token, if stored.
    pub access_token: Option<String>,
    /// The refresh token, if stored.
    pub refresh_token: Option<String>,
    /// The ID token, if stored.
    pub id_token: Option<String>,
}

impl StoredTokens {
    /// Returns a full [`Session`] if all three tokens are present.
    #[must_use]
    pub fn into_session(self) -> Option<Session> {
        match (self.access_token, self.refresh_token, self.id_token) {
            (Some(access), Some(refresh), Some(id)) => Some(Session::new(access, refresh, id)),
            _ => None,
        }
    }

    /// Returns `true` if no token is stored.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none() && self.id_token.is_none()
    }
}

impl fmt::Debug for StoredTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mask = |t: &Option<String>| t.as_ref().map(|t| format!("<{} chars>", t.len()));
        f.debug_struct("StoredTokens")
            .field("access_token", &mask(&self.access_token))
            .field("refresh_token", &mask(&self.refresh_token))
            .field("id_token", &mask(&self.id_token))
            .finish()
    }
}

/// Signals that a [`TokenStore`] created with [`TokenStore::pending`] has
/// finished loading.
///
/// Dropping the signal without calling [`mark_ready`](Self::mark_ready) also
/// releases waiters, so a failed loader cannot block a guard forever.
#[derive(Debug)]
pub struct ReadySignal(watch::Sender<bool>);

impl ReadySignal {
    /// Marks the store as ready.
    pub fn mark_ready(self) {
        self.0.send_replace(true);
    }
}

/// Reads and writes the `accessToken` / `refreshToken` / `idToken` entries.
///
/// The store is a cheap handle: clones share the same storage medium and
/// readiness signal. A session is written as a single batch, so readers see
/// either the previous session or the new one.
///
/// # Thread Safety
///
/// `TokenStore` is `Send + Sync`.
#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn Storage>,
    lifetimes: TokenLifetimes,
    ready: watch::Receiver<bool>,
}

// Verify TokenStore is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<TokenStore>();
};

impl TokenStore {
    /// Creates a store that is ready immediately.
    #[must_use]
    pub fn new(storage: impl Storage + 'static, lifetimes: TokenLifetimes) -> Self {
        Self::from_shared(Arc::new(storage), lifetimes)
    }

    /// Creates a ready store over shared storage.
    #[must_use]
    pub fn from_shared(storage: Arc<dyn Storage>, lifetimes: TokenLifetimes) -> Self {
        let (_, ready) = watch::channel(true);
        Self {
            storage,
            lifetimes,
            ready,
        }
    }

    /// Creates a store whose readiness is signalled later.
    ///
    /// Use this when the storage medium is hydrated asynchronously; guards
    /// wait (bounded by their settle timeout) until the signal fires.
    #[must_use]
    pub fn pending(storage: Arc<dyn Storage>, lifetimes: TokenLifetimes) -> (Self, ReadySignal) {
        let (tx, ready) = watch::channel(false);
        let store = Self {
            storage,
            lifetimes,
            ready,
        };
        (store, ReadySignal(tx))
    }

    /// Returns `true` once storage reads reflect persisted state.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        *self.ready.borrow() || self.ready.has_changed().is_err()
    }

    /// Waits until the store is ready.
    pub async fn ready(&self) {
        let mut ready = self.ready.clone();
        // A dropped signal counts as ready.
        let _ = ready.wait_for(|ready| *ready).await;
    }

    /// Returns the configured storage lifetimes.
    #[must_use]
    pub const fn lifetimes(&self) -> TokenLifetimes {
        self.lifetimes
    }

    /// Persists all three tokens, replacing any previous session.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the medium cannot be written.
    pub fn save(&self, session: &Session) -> Result<(), StorageError> {
        self.storage.write_batch(&[
            StorageWrite::Set {
                key: ACCESS_TOKEN_KEY.to_string(),
                value: session.access_token.clone(),
                ttl: self.lifetimes.access_token,
            },
            StorageWrite::Set {
                key: REFRESH_TOKEN_KEY.to_string(),
                value: session.refresh_token.clone(),
                ttl: self.lifetimes.refresh_token,
            },
            StorageWrite::Set {
                key: ID_TOKEN_KEY.to_string(),
                value: session.id_token.clone(),
                ttl: self.lifetimes.id_token,
            },
        ])?;
        tracing::info!(
            id_token_len = session.id_token.len(),
            "Session saved to token store"
        );
        Ok(())
    }

    /// Returns whatever tokens are currently stored, or `None` if none are.
    #[must_use]
    pub fn read(&self) -> Option<StoredTokens> {
        let tokens = StoredTokens {
            access_token: self.storage.get(ACCESS_TOKEN_KEY),
            refresh_token: self.storage.get(REFRESH_TOKEN_KEY),
            id_token: self.storage.get(ID_TOKEN_KEY),
        };
        if tokens.is_empty() {
            None
        } else {
            Some(tokens)
        }
    }

    /// Returns the stored session if all three tokens are present.
    #[must_use]
    pub fn load_session(&self) -> Option<Session> {
        self.read().and_then(StoredTokens::into_session)
    }

    /// Returns the stored ID token.
    #[must_use]
    pub fn id_token(&self) -> Option<String> {
        self.storage.get(ID_TOKEN_KEY)
    }

    /// Returns the stored refresh token.
    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.storage.get(REFRESH_TOKEN_KEY)
    }

    /// Returns `true` if a non-expired ID token is stored.
    #[must_use]
    pub fn has_valid_id_token(&self) -> bool {
        self.id_token().is_some_and(|token| token_is_live(&token))
    }

    /// Removes all three tokens. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the medium cannot be written.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.write_batch(&[
            StorageWrite::Remove {
                key: ACCESS_TOKEN_KEY.to_string(),
            },
            StorageWrite::Remove {
                key: REFRESH_TOKEN_KEY.to_string(),
            },
            StorageWrite::Remove {
                key: ID_TOKEN_KEY.to_string(),
            },
        ])?;
        tracing::info!("Token store cleared");
        Ok(())
    }
}

impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStore")
            .field("storage", &self.storage)
            .field("lifetimes", &self.lifetimes)
            .field("ready", &self.is_ready())
            .finish()
    }
}
