//! Silent session renewal.
//!
//! [`SessionRefresher::ensure_valid`] keeps the stored session usable without
//! prompting the user. Concurrent callers are coalesced: one refresh is in
//! flight at a time, and callers that waited behind it re-read the store
//! instead of refreshing again.

use std::fmt;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::auth::authenticator::establish_session;
use crate::auth::provider::IdentityProvider;
use crate::auth::session::token_is_live;
use crate::auth::AuthError;
use crate::storage::{StoredTokens, TokenStore};

/// What [`SessionRefresher::refresh_if_needed`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshStatus {
    /// The stored session was already valid; no network call was made.
    Valid,
    /// The session was renewed and the store replaced.
    Refreshed,
}

/// Validates the stored session and renews it through the refresh token.
///
/// Clones share the same in-flight lock, so every handle handed out by a
/// [`SessionContext`](crate::auth::SessionContext) is coalesced together.
pub struct SessionRefresher<P> {
    provider: Arc<P>,
    store: TokenStore,
    in_flight: Arc<Mutex<()>>,
}

impl<P> Clone for SessionRefresher<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            store: self.store.clone(),
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

impl<P> fmt::Debug for SessionRefresher<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionRefresher")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl<P: IdentityProvider> SessionRefresher<P> {
    /// Creates a refresher for the session held in `store`.
    #[must_use]
    pub fn new(provider: Arc<P>, store: TokenStore) -> Self {
        Self {
            provider,
            store,
            in_flight: Arc::new(Mutex::new(())),
        }
    }

    /// Returns `true` if a valid session is stored after this call.
    ///
    /// On a failed refresh the store has been cleared.
    pub async fn ensure_valid(&self) -> bool {
        self.refresh_if_needed().await.is_ok()
    }

    /// Validates the stored session, renewing it if it has expired.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unauthorized`] if nothing is stored, or
    /// [`AuthError::SessionExpired`] if renewal failed and the store was
    /// cleared. [`AuthError::Storage`] is returned if the store could not be
    /// written.
    pub async fn refresh_if_needed(&self) -> Result<RefreshStatus, AuthError> {
        let tokens = self.store.read().ok_or(AuthError::Unauthorized)?;
        if is_current(&tokens) {
            return Ok(RefreshStatus::Valid);
        }

        let _guard = self.in_flight.lock().await;

        // Re-read: a refresh may have completed while this call waited.
        let tokens = self.store.read().ok_or(AuthError::Unauthorized)?;
        if is_current(&tokens) {
            tracing::debug!("Session renewed by a concurrent refresh");
            return Ok(RefreshStatus::Valid);
        }

        let Some(refresh_token) = tokens.refresh_token.filter(|t| !t.is_empty()) else {
            return self.expire("no refresh token is stored".to_string());
        };

        tracing::debug!("Refreshing expired session");
        match self.provider.refresh_session(&refresh_token).await {
            Ok(issued) => match establish_session(&self.store, issued, Some(refresh_token)) {
                Ok(_) => Ok(RefreshStatus::Refreshed),
                Err(AuthError::Storage(error)) => Err(AuthError::Storage(error)),
                Err(error) => self.expire(error.to_string()),
            },
            Err(error) => self.expire(AuthError::from_provider(error).to_string()),
        }
    }

    fn expire(&self, reason: String) -> Result<RefreshStatus, AuthError> {
        self.store.clear()?;
        tracing::info!(reason = %reason, "Session refresh failed; signed out");
        Err(AuthError::SessionExpired { reason })
    }
}

/// Live ID and access tokens are enough; the refresh token only matters once
/// they expire.
fn is_current(tokens: &StoredTokens) -> bool {
    let live = |token: &Option<String>| token.as_deref().is_some_and(token_is_live);
    live(&tokens.id_token) && live(&tokens.access_token)
}
