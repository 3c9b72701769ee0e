//! Trouble reports (`/troubles`).

use serde::{Deserialize, Serialize};

use crate::clients::{ApiClient, ApiError, ApiRequest, HttpMethod};
use crate::resources::validation::{self, ValidationError};

/// A reported trouble.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TroubleItem {
    /// Identifier, also used as the comment thread key.
    pub item_id: String,
    /// Free-form category.
    pub category: String,
    /// Description of the trouble.
    pub message: String,
}

/// One page of troubles.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct TroublePage {
    /// Items on this page.
    #[serde(default)]
    pub items: Vec<TroubleItem>,
    /// Cursor for the next page, absent on the last page.
    #[serde(rename = "nextToken", default)]
    pub next_token: Option<String>,
}

impl TroublePage {
    /// Returns `true` if more pages are available.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.next_token.is_some()
    }
}

/// Payload for reporting a trouble.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewTrouble {
    /// Category, required.
    pub category: String,
    /// Message, required.
    pub message: String,
}

impl NewTrouble {
    /// Creates a payload.
    #[must_use]
    pub fn new(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            message: message.into(),
        }
    }

    /// Checks that both fields are non-blank.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Required`] for the first blank field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::required("category", &self.category)?;
        validation::required("message", &self.message)
    }
}

/// Response to a successful report.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CreatedTrouble {
    /// Server confirmation message.
    pub message: String,
    /// Identifier of the new trouble.
    pub item_id: String,
    /// Category as stored.
    pub category: String,
}

/// Typed access to the trouble endpoints.
#[derive(Clone, Debug)]
pub struct TroubleApi {
    client: ApiClient,
}

impl TroubleApi {
    /// Creates the resource over `client`.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Lists one page of troubles, starting at `next_token` if given.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn list(&self, next_token: Option<&str>) -> Result<TroublePage, ApiError> {
        let mut request = ApiRequest::builder(HttpMethod::Get, "/troubles");
        if let Some(token) = next_token {
            request = request.query_param("nextToken", token);
        }
        self.client.call(request.build()?).await
    }

    /// Validates and reports a trouble.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] without sending anything if a field is
    /// blank, otherwise any request failure.
    pub async fn create(&self, trouble: &NewTrouble) -> Result<CreatedTrouble, ApiError> {
        trouble.validate()?;
        self.client.post("/troubles", trouble).await
    }
}
