//! Sign-in, session renewal and the user's identity.
//!
//! # Overview
//!
//! - [`Session`]: The access/refresh/ID token triple
//! - [`Authenticator`]: Username/password sign-in and the new-password challenge
//! - [`SessionRefresher`]: Silent renewal with coalesced concurrent callers
//! - [`SessionContext`]: The injectable root that owns the store and [`AuthState`]
//! - [`UserInfo`]: Read-only identity derived from claims or provider attributes
//! - [`provider`]: The [`IdentityProvider`](provider::IdentityProvider) seam and
//!   the Cognito implementation
//!
//! # Session Lifecycle
//!
//! ```text
//! sign_in ──> Session stored ──> ensure_valid ──> (expired) refresh ──> Session stored
//!                                                      └──(rejected)──> store cleared
//! ```
//!
//! # Example
//!
//! ```rust
//! use console_session::Session;
//!
//! // Tokens that are not JWTs have no known expiry.
//! let session = Session::new("access", "refresh", "id");
//! assert!(!session.expired());
//! ```

mod authenticator;
mod context;
mod error;
mod password;
pub mod provider;
mod refresher;
pub(crate) mod session;
#[cfg(test)]
pub(crate) mod testing;
mod user;

pub use authenticator::{
    AuthChallenge, AuthOutcome, AuthPhase, Authenticator, ChallengeKind, ChallengeOutcome,
};
pub use context::{AuthState, SessionContext};
pub use error::{AuthError, ChallengeError};
pub use password::PasswordPolicy;
pub use refresher::{RefreshStatus, SessionRefresher};
pub use session::{Credentials, Session, TokenClaims};
pub use user::UserInfo;
