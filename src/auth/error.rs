//! Authentication error types.
//!
//! This module contains the error taxonomy surfaced by the sign-in,
//! challenge and refresh operations.
//!
//! # Error Types
//!
//! - [`AuthError::Credential`]: Wrong username or password (user-correctable)
//! - [`AuthError::Challenge`]: New password rejected while a challenge is pending
//! - [`AuthError::SessionExpired`]: Silent refresh failed; re-authentication required
//! - [`AuthError::Unauthorized`]: No session is stored
//! - [`AuthError::Transport`]: The identity provider could not be reached
//! - [`AuthError::UnsupportedChallenge`]: A challenge this library does not complete (e.g. MFA)
//! - [`AuthError::Provider`]: Any other provider rejection, message passed through verbatim
//! - [`AuthError::Storage`]: The token store could not be written
//!
//! # Example
//!
//! ```rust
//! use console_session::auth::{AuthError, ChallengeError};
//!
//! let error = AuthError::Challenge(ChallengeError::TooShort { min_length: 8 });
//! assert!(error.to_string().contains("at least 8 characters"));
//! assert!(error.is_user_correctable());
//! ```

use crate::auth::provider::ProviderError;
use crate::storage::StorageError;
use thiserror::Error;

/// Provider error codes that mean the credentials themselves were wrong.
const CREDENTIAL_ERROR_CODES: &[&str] = &["NotAuthorizedException", "UserNotFoundException"];

/// Provider error code returned when a new password fails the pool policy.
const INVALID_PASSWORD_CODE: &str = "InvalidPasswordException";

/// Reasons a new password is refused while a challenge is pending.
///
/// Every variant leaves the challenge pending; the caller re-prompts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChallengeError {
    /// The password is shorter than the policy minimum.
    #[error("Password must be at least {min_length} characters long")]
    TooShort {
        /// Minimum number of characters.
        min_length: usize,
    },

    /// The password has no lowercase letter.
    #[error("Password must contain at least one lowercase letter")]
    MissingLowercase,

    /// The password has no uppercase letter.
    #[error("Password must contain at least one uppercase letter")]
    MissingUppercase,

    /// The password has no digit.
    #[error("Password must contain at least one digit")]
    MissingDigit,

    /// The confirmation does not match the new password.
    #[error("Password confirmation does not match")]
    Mismatch,

    /// The provider refused the password for its own policy reasons.
    #[error("{message}")]
    Rejected {
        /// The provider's message, verbatim.
        message: String,
    },
}

/// Errors that can occur during authentication and session refresh.
///
/// # Thread Safety
///
/// `AuthError` is `Send + Sync`, making it safe to use across async boundaries.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong username or password.
    ///
    /// The attempt may be retried from scratch.
    #[error("{message}")]
    Credential {
        /// The provider's message, verbatim.
        message: String,
    },

    /// The new password was refused; the challenge stays pending.
    #[error(transparent)]
    Challenge(#[from] ChallengeError),

    /// The session could not be renewed and has been cleared.
    ///
    /// Only signing in again resolves this.
    #[error("Session expired: {reason}")]
    SessionExpired {
        /// Why the refresh failed.
        reason: String,
    },

    /// No session is stored.
    #[error("Not authenticated")]
    Unauthorized,

    /// The identity provider could not be reached or did not answer in time.
    #[error("Network error: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },

    /// The provider asked for a challenge this library does not complete.
    #[error("Unsupported authentication challenge: {name}")]
    UnsupportedChallenge {
        /// The provider's challenge name.
        name: String,
    },

    /// The provider rejected the request for another reason.
    #[error("{message}")]
    Provider {
        /// The provider's error code.
        code: String,
        /// The provider's message, verbatim.
        message: String,
    },

    /// The token store could not be updated.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// Returns `true` if the user can fix the problem by changing their input.
    #[must_use]
    pub const fn is_user_correctable(&self) -> bool {
        matches!(self, Self::Credential { .. } | Self::Challenge(_))
    }

    /// Returns `true` if the caller must send the user back to sign-in.
    #[must_use]
    pub const fn requires_sign_in(&self) -> bool {
        matches!(self, Self::SessionExpired { .. } | Self::Unauthorized)
    }

    /// Maps a provider failure during sign-in.
    pub(crate) fn from_sign_in(error: ProviderError) -> Self {
        match error {
            ProviderError::Rejected { code, message }
                if CREDENTIAL_ERROR_CODES.contains(&code.as_str()) =>
            {
                Self::Credential { message }
            }
            other => Self::from_provider(other),
        }
    }

    /// Maps a provider failure during challenge completion.
    ///
    /// Returns `Ok` with a [`ChallengeError`] when the challenge stays pending.
    pub(crate) fn from_challenge(error: ProviderError) -> Result<ChallengeError, Self> {
        match error {
            ProviderError::Rejected { code, message } if code == INVALID_PASSWORD_CODE => {
                Ok(ChallengeError::Rejected { message })
            }
            other => Err(Self::from_provider(other)),
        }
    }

    /// Maps any provider failure without operation-specific context.
    pub(crate) fn from_provider(error: ProviderError) -> Self {
        match error {
            ProviderError::Rejected { code, message } => Self::Provider { code, message },
            ProviderError::Transport { .. } | ProviderError::Timeout { .. } => Self::Transport {
                message: error.to_string(),
            },
            ProviderError::UnexpectedChallenge { name } => Self::UnsupportedChallenge { name },
            ProviderError::MalformedResponse { .. } => Self::Provider {
                code: "MalformedResponse".to_string(),
                message: error.to_string(),
            },
        }
    }
}

// Verify AuthError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AuthError>();
};
