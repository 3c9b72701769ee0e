//! Console roles (`/roles`).

use serde::{Deserialize, Serialize};

use crate::clients::{ApiClient, ApiError};
use crate::resources::validation::{self, ValidationError};

/// A role as listed by the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleItem {
    /// Unique identifier.
    pub role_id: String,
    /// Display name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Creation timestamp as sent by the backend.
    pub created_at: String,
    /// Last update timestamp as sent by the backend.
    pub updated_at: String,
}

#[derive(Deserialize)]
struct RoleList {
    #[serde(default)]
    roles: Vec<RoleItem>,
}

/// Payload for creating a role.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewRole {
    /// Display name, required.
    pub name: String,
    /// Description, may be empty.
    pub description: String,
}

impl NewRole {
    /// Creates a payload.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    /// Checks that the name is non-blank.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Required`] if the name is blank.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::required("name", &self.name)
    }
}

/// Typed access to the role endpoints.
#[derive(Clone, Debug)]
pub struct RoleApi {
    client: ApiClient,
}

impl RoleApi {
    /// Creates the resource over `client`.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Lists every role.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn list(&self) -> Result<Vec<RoleItem>, ApiError> {
        let list: RoleList = self.client.get("/roles").await?;
        Ok(list.roles)
    }

    /// Validates and creates a role, returning the backend's acknowledgement.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] without sending anything if the name
    /// is blank, otherwise any request failure.
    pub async fn create(&self, role: &NewRole) -> Result<serde_json::Value, ApiError> {
        role.validate()?;
        self.client.post("/roles", role).await
    }
}
