//! Session types for the authentication lifecycle.
//!
//! This module provides the [`Session`] token triple, the [`TokenClaims`]
//! read from a token's payload, and the transient [`Credentials`] pair.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, decode_header, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Leeway applied when comparing token expiry against the clock.
pub const EXPIRY_LEEWAY_SECS: i64 = 10;

/// Claims read from a provider-issued token.
///
/// Signatures are not verified here: the provider and the REST backends are
/// the authority. The client only needs expiry and identity hints.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct TokenClaims {
    /// Subject (stable user identifier).
    #[serde(default)]
    pub sub: Option<String>,

    /// Expiration timestamp (Unix seconds).
    #[serde(default)]
    pub exp: Option<i64>,

    /// Issued-at timestamp (Unix seconds).
    #[serde(default)]
    pub iat: Option<i64>,

    /// `id` or `access`.
    #[serde(default)]
    pub token_use: Option<String>,

    /// User name (`cognito:username` in ID tokens, `username` in access tokens).
    #[serde(default, rename = "cognito:username", alias = "username")]
    pub username: Option<String>,

    /// E-mail address, when present in the token.
    #[serde(default)]
    pub email: Option<String>,

    /// Every other claim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl TokenClaims {
    /// Decodes the payload of a JWT without verifying its signature.
    ///
    /// # Errors
    ///
    /// Returns an error if `token` is not a structurally valid JWT.
    pub fn decode(token: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        let header = decode_header(token)?;

        let mut validation = Validation::new(header.alg);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data = decode::<Self>(token, &DecodingKey::from_secret(&[]), &validation)?;
        Ok(data.claims)
    }

    /// Returns the expiry as a timestamp, if the token carries one.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp
            .and_then(|exp| Utc.timestamp_opt(exp, 0).single())
    }
}

/// Returns the expiry encoded in `token`, or `None` if it has none or is not a JWT.
pub(crate) fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    TokenClaims::decode(token).ok().and_then(|c| c.expires_at())
}

/// Returns `true` if `expires` has passed, allowing [`EXPIRY_LEEWAY_SECS`].
pub(crate) fn is_past(expires: Option<DateTime<Utc>>) -> bool {
    expires.is_some_and(|expires| Utc::now() + Duration::seconds(EXPIRY_LEEWAY_SECS) >= expires)
}

/// Returns `true` if `token` is non-empty and not past its `exp` claim.
///
/// Tokens that are not JWTs carry no expiry and count as unexpired; storage
/// expiry still bounds their lifetime.
pub(crate) fn token_is_live(token: &str) -> bool {
    !token.is_empty() && !is_past(token_expiry(token))
}

/// An authenticated session: the access, refresh and ID token triple.
///
/// A session is always complete; partial token sets are represented by
/// [`StoredTokens`](crate::storage::StoredTokens) instead.
///
/// # Thread Safety
///
/// `Session` is `Send + Sync`, making it safe to share across threads.
///
/// # Example
///
/// ```rust
/// use console_session::Session;
///
/// let session = Session::new("access", "refresh", "id");
/// // Opaque (non-JWT) tokens carry no expiry.
/// assert!(session.expires.is_none());
/// assert!(session.is_valid());
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Access token for provider user operations.
    pub access_token: String,

    /// Refresh token used to renew the session silently.
    pub refresh_token: String,

    /// ID token presented as the bearer credential to REST backends.
    pub id_token: String,

    /// When the ID token expires, if it carries an `exp` claim.
    pub expires: Option<DateTime<Utc>>,
}

impl Session {
    /// Creates a session, reading the expiry from the ID token's claims.
    #[must_use]
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        id_token: impl Into<String>,
    ) -> Self {
        let id_token = id_token.into();
        let expires = token_expiry(&id_token);
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            id_token,
            expires,
        }
    }

    /// Returns `true` if the ID or access token has expired.
    #[must_use]
    pub fn expired(&self) -> bool {
        is_past(self.expires) || is_past(token_expiry(&self.access_token))
    }

    /// Returns `true` if every token is present and none has expired.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.access_token.is_empty()
            && !self.refresh_token.is_empty()
            && !self.id_token.is_empty()
            && !self.expired()
    }

    /// Decodes the ID token's claims.
    #[must_use]
    pub fn id_claims(&self) -> Option<TokenClaims> {
        TokenClaims::decode(&self.id_token).ok()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &format_args!("<{} chars>", self.access_token.len()))
            .field("refresh_token", &format_args!("<{} chars>", self.refresh_token.len()))
            .field("id_token", &format_args!("<{} chars>", self.id_token.len()))
            .field("expires", &self.expires)
            .finish()
    }
}

// Verify Session is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Session>();
};

/// A username and password pair. Never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// User name or e-mail address.
    pub username: String,
    /// Password.
    pub password: String,
}

impl Credentials {
    /// Creates a credential pair.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"*****")
            .finish()
    }
}
