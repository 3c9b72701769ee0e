//! The process-wide session root.
//!
//! # Overview
//!
//! [`SessionContext`] owns the identity provider, the [`TokenStore`] and the
//! observable [`AuthState`]. Everything that needs the session (the guard,
//! the API clients, the refresher) is handed out from here and shares the same
//! store, so there is exactly one source of truth per context.
//!
//! # Example
//!
//! ```rust,ignore
//! use console_session::auth::{AuthOutcome, Credentials, SessionContext};
//! use console_session::storage::MemoryStorage;
//! use console_session::SessionConfig;
//!
//! let context = SessionContext::cognito(SessionConfig::from_env()?, MemoryStorage::new());
//! context.initialize().await?;
//!
//! let mut state = context.subscribe();
//! match context.sign_in(&Credentials::new("alice", "hunter22")).await {
//!     AuthOutcome::Success(_) => println!("Hello {:?}", state.borrow_and_update().user),
//!     other => println!("{:?}", other.phase()),
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

use crate::auth::provider::{CognitoProvider, IdentityProvider};
use crate::auth::{
    AuthChallenge, AuthError, AuthOutcome, Authenticator, ChallengeOutcome, Credentials,
    SessionRefresher, TokenClaims, UserInfo,
};
use crate::clients::ApiClient;
use crate::config::{BaseUrl, SessionConfig};
use crate::error::ConfigError;
use crate::guard::AuthGuard;
use crate::storage::{Storage, TokenStore};

/// UI-facing authentication state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthState {
    /// The signed-in user, absent when signed out.
    pub user: Option<UserInfo>,
    /// `true` until the first hydration from the store has finished.
    pub loading: bool,
}

impl AuthState {
    /// Returns `true` if a user is signed in.
    #[must_use]
    pub const fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }
}

/// Injectable owner of the session and everything derived from it.
///
/// Clones share the store, the refresh lock and the state channel.
///
/// # Thread Safety
///
/// `SessionContext` is `Send + Sync` when the provider is.
pub struct SessionContext<P> {
    config: Arc<SessionConfig>,
    provider: Arc<P>,
    store: TokenStore,
    authenticator: Authenticator<P>,
    refresher: SessionRefresher<P>,
    state: Arc<watch::Sender<AuthState>>,
}

impl<P> Clone for SessionContext<P> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            provider: Arc::clone(&self.provider),
            store: self.store.clone(),
            authenticator: self.authenticator.clone(),
            refresher: self.refresher.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

impl<P> fmt::Debug for SessionContext<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("config", &self.config)
            .field("store", &self.store)
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

// Verify SessionContext is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<SessionContext<CognitoProvider>>();
};

impl SessionContext<CognitoProvider> {
    /// Creates a context talking to Cognito as described by `config`.
    #[must_use]
    pub fn cognito(config: SessionConfig, storage: impl Storage + 'static) -> Self {
        let provider = CognitoProvider::new(&config);
        let store = TokenStore::new(storage, config.token_lifetimes());
        Self::with_store(config, provider, store)
    }
}

impl<P: IdentityProvider> SessionContext<P> {
    /// Creates a context over `provider` with tokens kept in `storage`.
    #[must_use]
    pub fn new(config: SessionConfig, provider: P, storage: Arc<dyn Storage>) -> Self {
        let store = TokenStore::from_shared(storage, config.token_lifetimes());
        Self::with_store(config, provider, store)
    }

    /// Creates a context over an existing store, e.g. one made with
    /// [`TokenStore::pending`].
    #[must_use]
    pub fn with_store(config: SessionConfig, provider: P, store: TokenStore) -> Self {
        let provider = Arc::new(provider);
        let authenticator =
            Authenticator::new(Arc::clone(&provider), store.clone(), *config.password_policy());
        let refresher = SessionRefresher::new(Arc::clone(&provider), store.clone());
        let (state, _) = watch::channel(AuthState::default());

        Self {
            config: Arc::new(config),
            provider,
            store,
            authenticator,
            refresher,
            state: Arc::new(state),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Returns the shared token store.
    #[must_use]
    pub const fn store(&self) -> &TokenStore {
        &self.store
    }

    /// Returns the authenticator.
    #[must_use]
    pub const fn authenticator(&self) -> &Authenticator<P> {
        &self.authenticator
    }

    /// Returns the refresher.
    #[must_use]
    pub const fn refresher(&self) -> &SessionRefresher<P> {
        &self.refresher
    }

    /// Returns a snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Returns a receiver that observes every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// Hydrates the state from the token store.
    ///
    /// `loading` is `true` while this runs and `false` afterwards, whatever the
    /// outcome.
    ///
    /// # Errors
    ///
    /// See [`SessionContext::refresh_user`].
    pub async fn initialize(&self) -> Result<Option<UserInfo>, AuthError> {
        self.state.send_modify(|state| state.loading = true);
        self.store.ready().await;
        let result = self.refresh_user().await;
        self.state.send_modify(|state| state.loading = false);
        result
    }

    /// Re-reads the current user, renewing the session first if needed.
    ///
    /// Attributes are fetched from the identity provider. If that call fails
    /// the ID token's claims are used instead.
    ///
    /// # Errors
    ///
    /// A missing or unrenewable session yields `Ok(None)`. Returns
    /// [`AuthError::Storage`] if the store could not be written.
    pub async fn refresh_user(&self) -> Result<Option<UserInfo>, AuthError> {
        match self.refresher.refresh_if_needed().await {
            Ok(_) => {}
            Err(AuthError::Unauthorized | AuthError::SessionExpired { .. }) => {
                self.set_user(None);
                return Ok(None);
            }
            Err(error) => {
                self.set_user(None);
                return Err(error);
            }
        }

        let Some(tokens) = self.store.read() else {
            self.set_user(None);
            return Ok(None);
        };

        let from_claims = tokens.id_token.as_deref().and_then(UserInfo::from_id_token);
        let user = match tokens.access_token.as_deref() {
            Some(access) => match self.provider.get_user_attributes(access).await {
                Ok(attributes) => Some(UserInfo::from_attributes(attributes)),
                Err(error) => {
                    tracing::warn!(error = %error, "Could not fetch user attributes; using token claims");
                    from_claims
                }
            },
            None => from_claims,
        };

        self.set_user(user.clone());
        Ok(user)
    }

    /// Signs in and publishes the new user on success.
    pub async fn sign_in(&self, credentials: &Credentials) -> AuthOutcome {
        let outcome = self
            .authenticator
            .authenticate(&credentials.username, &credentials.password)
            .await;
        if let AuthOutcome::Success(session) = &outcome {
            self.set_user(Some(user_from_session(
                session.id_claims(),
                &credentials.username,
            )));
        }
        outcome
    }

    /// Completes a new-password challenge after checking the confirmation,
    /// and publishes the user on success.
    pub async fn complete_new_password(
        &self,
        challenge: AuthChallenge,
        new_password: &str,
        confirmation: &str,
    ) -> ChallengeOutcome {
        let username = challenge.username().to_string();
        let outcome = self
            .authenticator
            .complete_new_password_confirmed(challenge, new_password, confirmation)
            .await;
        if let ChallengeOutcome::Success(session) = &outcome {
            self.set_user(Some(user_from_session(session.id_claims(), &username)));
        }
        outcome
    }

    /// Clears the session and the user. Safe to call when signed out.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Storage`] if the store could not be cleared. The
    /// state is reset regardless.
    pub fn sign_out(&self) -> Result<(), AuthError> {
        let result = self.store.clear();
        self.set_user(None);
        result.map_err(AuthError::from)
    }

    /// Makes sure a valid session is stored, renewing it if needed.
    ///
    /// Clears the user when this returns `false`.
    pub async fn ensure_valid(&self) -> bool {
        let valid = self.refresher.ensure_valid().await;
        if !valid {
            self.set_user(None);
        }
        valid
    }

    /// Returns a route guard over the shared store.
    #[must_use]
    pub fn guard(&self) -> AuthGuard {
        AuthGuard::from_config(self.store.clone(), &self.config)
    }

    /// Returns a client for the main REST backend.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if no API base URL is
    /// configured.
    pub fn api_client(&self) -> Result<ApiClient, ConfigError> {
        self.client_for(self.config.api_base_url(), "api_base_url")
    }

    /// Returns a client for the comments backend.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if no comments URL is
    /// configured.
    pub fn comments_client(&self) -> Result<ApiClient, ConfigError> {
        self.client_for(self.config.comments_api_url(), "comments_api_url")
    }

    fn client_for(
        &self,
        url: Option<&BaseUrl>,
        field: &'static str,
    ) -> Result<ApiClient, ConfigError> {
        let url = url.ok_or(ConfigError::MissingRequiredField { field })?;
        Ok(ApiClient::new(url.clone(), self.store.clone()))
    }

    fn set_user(&self, user: Option<UserInfo>) {
        self.state.send_if_modified(|state| {
            if state.user == user {
                return false;
            }
            tracing::debug!(signed_in = user.is_some(), "Auth state changed");
            state.user = user;
            true
        });
    }
}

fn user_from_session(claims: Option<TokenClaims>, username: &str) -> UserInfo {
    claims
        .and_then(UserInfo::from_claims)
        .unwrap_or_else(|| UserInfo {
            username: username.trim().to_string(),
            email: None,
            attributes: BTreeMap::new(),
        })
}
