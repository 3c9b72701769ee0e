//! The signed-in user's identity.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::auth::provider::UserAttributes;
use crate::auth::TokenClaims;

/// Read-only projection of the current user's identity.
///
/// Built either from the ID token's claims (no network access) or from the
/// attributes fetched from the identity provider. Never persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    /// The provider user name.
    pub username: String,
    /// E-mail address, if known.
    pub email: Option<String>,
    /// Remaining attributes as string pairs.
    pub attributes: BTreeMap<String, String>,
}

impl UserInfo {
    /// Builds the projection from ID token claims.
    ///
    /// Returns `None` if the token cannot be decoded or names no user.
    #[must_use]
    pub fn from_id_token(id_token: &str) -> Option<Self> {
        let claims = TokenClaims::decode(id_token).ok()?;
        Self::from_claims(claims)
    }

    /// Builds the projection from already decoded claims.
    ///
    /// Falls back to `sub` when the token carries no user name.
    #[must_use]
    pub fn from_claims(claims: TokenClaims) -> Option<Self> {
        let username = claims.username.or_else(|| claims.sub.clone())?;

        let mut attributes: BTreeMap<String, String> = claims
            .extra
            .into_iter()
            .filter_map(|(key, value)| match value {
                serde_json::Value::String(s) => Some((key, s)),
                serde_json::Value::Bool(b) => Some((key, b.to_string())),
                serde_json::Value::Number(n) => Some((key, n.to_string())),
                _ => None,
            })
            .collect();
        if let Some(sub) = claims.sub {
            attributes.insert("sub".to_string(), sub);
        }
        if let Some(email) = &claims.email {
            attributes.insert("email".to_string(), email.clone());
        }

        Some(Self {
            username,
            email: claims.email,
            attributes,
        })
    }

    /// Builds the projection from provider attributes.
    #[must_use]
    pub fn from_attributes(user: UserAttributes) -> Self {
        Self {
            email: user.attributes.get("email").cloned(),
            username: user.username,
            attributes: user.attributes,
        }
    }

    /// Returns the attribute named `name`.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}
