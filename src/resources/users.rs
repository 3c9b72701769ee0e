//! Console users (`/users`).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::clients::{ApiClient, ApiError};
use crate::resources::validation::{self, ValidationError};

/// A console user as listed by the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserItem {
    /// Unique identifier.
    pub user_id: String,
    /// Sign-in name.
    pub username: String,
    /// Contact address.
    pub email: String,
    /// Creation timestamp as sent by the backend.
    pub created_at: String,
    /// Last update timestamp as sent by the backend.
    pub updated_at: String,
}

#[derive(Deserialize)]
struct UserList {
    #[serde(default)]
    users: Vec<UserItem>,
}

/// Payload for creating a user.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct NewUser {
    /// Sign-in name, required.
    pub username: String,
    /// Contact address, required.
    pub email: String,
    /// Initial password, required.
    pub password: String,
}

impl NewUser {
    /// Creates a payload.
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    /// Checks that every field is non-blank.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Required`] for the first blank field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::required("username", &self.username)?;
        validation::required("email", &self.email)?;
        validation::required("password", &self.password)
    }
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"*****")
            .finish()
    }
}

/// Typed access to the user endpoints.
#[derive(Clone, Debug)]
pub struct UserApi {
    client: ApiClient,
}

impl UserApi {
    /// Creates the resource over `client`.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Lists every user.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn list(&self) -> Result<Vec<UserItem>, ApiError> {
        let list: UserList = self.client.get("/users").await?;
        Ok(list.users)
    }

    /// Validates and creates a user, returning the backend's acknowledgement.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] without sending anything if a field is
    /// blank, otherwise any request failure.
    pub async fn create(&self, user: &NewUser) -> Result<serde_json::Value, ApiError> {
        user.validate()?;
        self.client.post("/users", user).await
    }
}
