//! Username/password sign-in and the new-password challenge.
//!
//! # Overview
//!
//! The exchange is a small state machine:
//!
//! ```text
//! AwaitingCredentials --(valid credentials)--------> Authenticated
//! AwaitingCredentials --(new password required)----> ChallengePending
//! ChallengePending    --(accepted new password)----> Authenticated
//! ChallengePending    --(policy violation)---------> ChallengePending
//! any                 --(provider rejection)-------> Failed
//! ```
//!
//! Each call returns a tagged outcome rather than invoking callbacks. A pending
//! challenge is a value ([`AuthChallenge`]) that is consumed by the completion
//! call and handed back only when the caller should re-prompt.
//!
//! # Example
//!
//! ```rust,ignore
//! match authenticator.authenticate("bob", "temp-pw").await {
//!     AuthOutcome::Success(session) => println!("Signed in until {:?}", session.expires),
//!     AuthOutcome::ChallengeRequired(challenge) => {
//!         match authenticator.complete_new_password(challenge, "Str0ngPass").await {
//!             ChallengeOutcome::Success(_) => println!("Password changed"),
//!             ChallengeOutcome::Retry { error, .. } => println!("{error}"),
//!             ChallengeOutcome::Failure(error) => println!("{error}"),
//!         }
//!     }
//!     AuthOutcome::Failure(error) => println!("{error}"),
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::auth::provider::{
    IdentityProvider, InitiateAuthResponse, ProviderTokens, NEW_PASSWORD_REQUIRED,
};
use crate::auth::{AuthError, ChallengeError, PasswordPolicy, Session};
use crate::storage::TokenStore;

/// States of the sign-in exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthPhase {
    /// No exchange in progress.
    AwaitingCredentials,
    /// The provider asked for a new password.
    ChallengePending,
    /// A session has been issued and stored.
    Authenticated,
    /// The attempt failed; a new attempt starts from credentials.
    Failed,
}

/// The kind of challenge the provider issued.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChallengeKind {
    /// The user must choose a new password.
    NewPasswordRequired,
    /// A multi-factor challenge (recognized, not completed here).
    Mfa(String),
    /// Any other challenge.
    Other(String),
}

impl ChallengeKind {
    /// Classifies a provider challenge name.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        if name == NEW_PASSWORD_REQUIRED {
            Self::NewPasswordRequired
        } else if name.contains("MFA") {
            Self::Mfa(name.to_string())
        } else {
            Self::Other(name.to_string())
        }
    }

    /// Returns the provider challenge name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::NewPasswordRequired => NEW_PASSWORD_REQUIRED,
            Self::Mfa(name) | Self::Other(name) => name,
        }
    }
}

/// An exchange waiting for supplementary input.
///
/// Holds the provider's opaque continuation handle. It is not `Clone`:
/// completing the challenge consumes it.
pub struct AuthChallenge {
    username: String,
    continuation: String,
    kind: ChallengeKind,
    parameters: BTreeMap<String, String>,
}

impl AuthChallenge {
    /// Returns the user the challenge was issued for.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the challenge kind.
    #[must_use]
    pub const fn kind(&self) -> &ChallengeKind {
        &self.kind
    }

    /// Returns the provider's challenge parameters.
    #[must_use]
    pub const fn parameters(&self) -> &BTreeMap<String, String> {
        &self.parameters
    }
}

impl fmt::Debug for AuthChallenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthChallenge")
            .field("username", &self.username)
            .field("kind", &self.kind)
            .field("continuation", &"*****")
            .field("parameters", &self.parameters)
            .finish()
    }
}

/// Result of [`Authenticator::authenticate`].
#[derive(Debug)]
pub enum AuthOutcome {
    /// The session was issued and stored.
    Success(Session),
    /// A new password is required before a session is issued.
    ChallengeRequired(AuthChallenge),
    /// The attempt failed.
    Failure(AuthError),
}

impl AuthOutcome {
    /// Returns the exchange state this outcome leaves the caller in.
    #[must_use]
    pub const fn phase(&self) -> AuthPhase {
        match self {
            Self::Success(_) => AuthPhase::Authenticated,
            Self::ChallengeRequired(_) => AuthPhase::ChallengePending,
            Self::Failure(_) => AuthPhase::Failed,
        }
    }
}

/// Result of completing a new-password challenge.
#[derive(Debug)]
pub enum ChallengeOutcome {
    /// The session was issued and stored.
    Success(Session),
    /// The password was refused; re-prompt and complete `challenge` again.
    Retry {
        /// The still-pending challenge.
        challenge: AuthChallenge,
        /// Why the password was refused.
        error: ChallengeError,
    },
    /// The exchange failed; start over from credentials.
    Failure(AuthError),
}

impl ChallengeOutcome {
    /// Returns the exchange state this outcome leaves the caller in.
    #[must_use]
    pub const fn phase(&self) -> AuthPhase {
        match self {
            Self::Success(_) => AuthPhase::Authenticated,
            Self::Retry { .. } => AuthPhase::ChallengePending,
            Self::Failure(_) => AuthPhase::Failed,
        }
    }
}

/// Runs the sign-in exchange and stores the resulting session.
pub struct Authenticator<P> {
    provider: Arc<P>,
    store: TokenStore,
    policy: PasswordPolicy,
}

impl<P> Clone for Authenticator<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            store: self.store.clone(),
            policy: self.policy,
        }
    }
}

impl<P> fmt::Debug for Authenticator<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authenticator")
            .field("store", &self.store)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl<P: IdentityProvider> Authenticator<P> {
    /// Creates an authenticator writing sessions to `store`.
    #[must_use]
    pub const fn new(provider: Arc<P>, store: TokenStore, policy: PasswordPolicy) -> Self {
        Self {
            provider,
            store,
            policy,
        }
    }

    /// Returns the password policy applied to new passwords.
    #[must_use]
    pub const fn policy(&self) -> &PasswordPolicy {
        &self.policy
    }

    /// Signs in with a username and password.
    ///
    /// On success the session is persisted before this returns. Empty
    /// credentials fail locally without contacting the provider. Challenges
    /// other than a new-password request fail with
    /// [`AuthError::UnsupportedChallenge`].
    pub async fn authenticate(&self, username: &str, password: &str) -> AuthOutcome {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return AuthOutcome::Failure(AuthError::Credential {
                message: "Username and password are required".to_string(),
            });
        }

        let response = match self.provider.initiate_auth(username, password).await {
            Ok(response) => response,
            Err(error) => {
                let error = AuthError::from_sign_in(error);
                tracing::debug!(username, error = %error, "Sign-in failed");
                return AuthOutcome::Failure(error);
            }
        };

        match response {
            InitiateAuthResponse::Authenticated(tokens) => match self.establish(tokens, None) {
                Ok(session) => {
                    tracing::debug!(username, "Sign-in succeeded");
                    AuthOutcome::Success(session)
                }
                Err(error) => AuthOutcome::Failure(error),
            },
            InitiateAuthResponse::Challenge {
                name,
                session,
                parameters,
            } => {
                let kind = ChallengeKind::from_name(&name);
                if kind != ChallengeKind::NewPasswordRequired {
                    tracing::debug!(username, challenge = %name, "Unsupported challenge");
                    return AuthOutcome::Failure(AuthError::UnsupportedChallenge { name });
                }
                tracing::debug!(username, "New password required");
                AuthOutcome::ChallengeRequired(AuthChallenge {
                    username: username.to_string(),
                    continuation: session,
                    kind,
                    parameters,
                })
            }
        }
    }

    /// Completes a new-password challenge.
    ///
    /// The password policy is checked first; a violation hands the challenge
    /// back without contacting the provider.
    pub async fn complete_new_password(
        &self,
        challenge: AuthChallenge,
        new_password: &str,
    ) -> ChallengeOutcome {
        if let Err(error) = self.policy.validate(new_password) {
            return ChallengeOutcome::Retry { challenge, error };
        }

        let result = self
            .provider
            .complete_new_password(&challenge.username, &challenge.continuation, new_password)
            .await;

        match result {
            Ok(tokens) => match self.establish(tokens, None) {
                Ok(session) => {
                    tracing::debug!(username = %challenge.username, "New password accepted");
                    ChallengeOutcome::Success(session)
                }
                Err(error) => ChallengeOutcome::Failure(error),
            },
            Err(error) => match AuthError::from_challenge(error) {
                Ok(error) => ChallengeOutcome::Retry { challenge, error },
                Err(error) => ChallengeOutcome::Failure(error),
            },
        }
    }

    /// Completes a new-password challenge after checking the confirmation.
    pub async fn complete_new_password_confirmed(
        &self,
        challenge: AuthChallenge,
        new_password: &str,
        confirmation: &str,
    ) -> ChallengeOutcome {
        if new_password != confirmation {
            return ChallengeOutcome::Retry {
                challenge,
                error: ChallengeError::Mismatch,
            };
        }
        self.complete_new_password(challenge, new_password).await
    }

    /// Turns issued tokens into a stored session.
    ///
    /// `fallback_refresh` is used when the provider omits the refresh token.
    pub(crate) fn establish(
        &self,
        tokens: ProviderTokens,
        fallback_refresh: Option<String>,
    ) -> Result<Session, AuthError> {
        establish_session(&self.store, tokens, fallback_refresh)
    }
}

/// Builds a full session from issued tokens and persists it.
pub(crate) fn establish_session(
    store: &TokenStore,
    tokens: ProviderTokens,
    fallback_refresh: Option<String>,
) -> Result<Session, AuthError> {
    let refresh_token = tokens
        .refresh_token
        .filter(|t| !t.is_empty())
        .or(fallback_refresh)
        .ok_or_else(|| AuthError::Provider {
            code: "MalformedResponse".to_string(),
            message: "Identity provider issued no refresh token".to_string(),
        })?;

    let session = Session::new(tokens.access_token, refresh_token, tokens.id_token);
    store.save(&session)?;
    Ok(session)
}
