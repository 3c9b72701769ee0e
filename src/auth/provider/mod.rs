//! Identity provider abstraction.
//!
//! The session lifecycle depends only on the [`IdentityProvider`] contract.
//! [`CognitoProvider`] implements it against the Cognito user pool JSON API;
//! tests and alternative backends supply their own implementations.
//!
//! # Overview
//!
//! - [`IdentityProvider::initiate_auth`]: username/password to tokens or a challenge
//! - [`IdentityProvider::complete_new_password`]: answers a new-password challenge
//! - [`IdentityProvider::refresh_session`]: exchanges a refresh token for fresh tokens
//! - [`IdentityProvider::get_user_attributes`]: reads the user's attribute map

mod cognito;

pub use cognito::CognitoProvider;

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// Challenge name for a forced password change.
pub const NEW_PASSWORD_REQUIRED: &str = "NEW_PASSWORD_REQUIRED";

/// Errors reported by an [`IdentityProvider`].
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider answered with an error.
    #[error("{message}")]
    Rejected {
        /// Provider error code, e.g. `NotAuthorizedException`.
        code: String,
        /// Provider message, verbatim.
        message: String,
    },

    /// The request could not be sent or the response could not be read.
    #[error("{message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },

    /// The provider did not answer within the configured timeout.
    #[error("Identity provider did not respond within {after:?}")]
    Timeout {
        /// The elapsed timeout.
        after: Duration,
    },

    /// A challenge was returned where tokens were expected.
    #[error("Unexpected challenge from identity provider: {name}")]
    UnexpectedChallenge {
        /// The provider's challenge name.
        name: String,
    },

    /// A success response could not be decoded.
    #[error("Malformed identity provider response: {message}")]
    MalformedResponse {
        /// Description of the decode failure.
        message: String,
    },
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport {
            message: error.to_string(),
        }
    }
}

/// Tokens issued by the provider.
///
/// A refresh response usually omits the refresh token; callers keep the one
/// they already hold.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderTokens {
    /// Access token.
    pub access_token: String,
    /// ID token.
    pub id_token: String,
    /// Refresh token, when issued.
    pub refresh_token: Option<String>,
    /// Access token lifetime in seconds, when reported.
    pub expires_in: Option<i64>,
}

impl fmt::Debug for ProviderTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderTokens")
            .field("access_token", &format_args!("<{} chars>", self.access_token.len()))
            .field("id_token", &format_args!("<{} chars>", self.id_token.len()))
            .field("refresh_token", &self.refresh_token.as_ref().map(String::len))
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Result of [`IdentityProvider::initiate_auth`].
#[derive(Debug)]
pub enum InitiateAuthResponse {
    /// The credentials were accepted and tokens issued.
    Authenticated(ProviderTokens),

    /// The provider requires another step before issuing tokens.
    Challenge {
        /// Challenge name, e.g. `NEW_PASSWORD_REQUIRED`.
        name: String,
        /// Opaque continuation handle for the next call.
        session: String,
        /// Challenge parameters as sent by the provider.
        parameters: BTreeMap<String, String>,
    },
}

/// A user's provider-side identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserAttributes {
    /// The provider user name.
    pub username: String,
    /// Attribute names mapped to values.
    pub attributes: BTreeMap<String, String>,
}

/// A remote identity provider.
///
/// Implementations must be shareable across tasks; every call is a single
/// request with no retry.
pub trait IdentityProvider: Send + Sync {
    /// Starts a username/password exchange.
    fn initiate_auth(
        &self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<InitiateAuthResponse, ProviderError>> + Send;

    /// Answers a `NEW_PASSWORD_REQUIRED` challenge.
    fn complete_new_password(
        &self,
        username: &str,
        continuation: &str,
        new_password: &str,
    ) -> impl Future<Output = Result<ProviderTokens, ProviderError>> + Send;

    /// Exchanges a refresh token for fresh tokens.
    fn refresh_session(
        &self,
        refresh_token: &str,
    ) -> impl Future<Output = Result<ProviderTokens, ProviderError>> + Send;

    /// Reads the attributes of the user owning `access_token`.
    fn get_user_attributes(
        &self,
        access_token: &str,
    ) -> impl Future<Output = Result<UserAttributes, ProviderError>> + Send;
}
