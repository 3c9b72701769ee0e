//! Comments on trouble reports (`/comments`, served by the comments backend).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clients::{ApiClient, ApiError, ApiRequest, HttpMethod};
use crate::resources::validation::{self, ValidationError};

/// A stored comment.
///
/// The sort key has the form `COMMENT#<timestamp>#<comment id>`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentItem {
    /// Partition key.
    #[serde(rename = "PK")]
    pub pk: String,
    /// Sort key.
    #[serde(rename = "SK")]
    pub sk: String,
    /// Author.
    pub user_id: String,
    /// Comment text.
    pub comment: String,
}

impl CommentItem {
    /// Returns the comment id embedded in the sort key.
    #[must_use]
    pub fn comment_id(&self) -> Option<&str> {
        self.sk.split('#').nth(2).filter(|id| !id.is_empty())
    }

    /// Returns the creation time embedded in the sort key.
    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.sk.split('#').nth(1)?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}

/// Payload for adding a comment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewComment {
    /// The trouble being commented on.
    pub trouble_id: String,
    /// Comment text, required.
    pub comment: String,
}

impl NewComment {
    /// Creates a payload.
    #[must_use]
    pub fn new(trouble_id: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            trouble_id: trouble_id.into(),
            comment: comment.into(),
        }
    }

    /// Checks that both fields are non-blank.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Required`] for the first blank field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::required("trouble_id", &self.trouble_id)?;
        validation::required("comment", &self.comment)
    }
}

/// Typed access to the comment endpoints.
///
/// Build it over a client for the comments backend, see
/// [`SessionContext::comments_client`](crate::auth::SessionContext::comments_client).
#[derive(Clone, Debug)]
pub struct CommentApi {
    client: ApiClient,
}

impl CommentApi {
    /// Creates the resource over `client`.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Lists the comments on a trouble.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn list(&self, trouble_id: &str) -> Result<Vec<CommentItem>, ApiError> {
        let request = ApiRequest::builder(HttpMethod::Get, "/comments")
            .query_param("trouble_id", trouble_id)
            .build()?;
        self.client.call(request).await
    }

    /// Validates and adds a comment. The text is trimmed before sending.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] without sending anything if a field is
    /// blank, otherwise any request failure.
    pub async fn create(&self, comment: &NewComment) -> Result<CommentItem, ApiError> {
        comment.validate()?;
        let trimmed = NewComment::new(comment.trouble_id.as_str(), comment.comment.trim());
        self.client.post("/comments", &trimmed).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn item(sk: &str) -> CommentItem {
        serde_json::from_value(json!({
            "PK": "TROUBLE#t1",
            "SK": sk,
            "user_id": "alice",
            "comment": "seen it too"
        }))
        .unwrap()
    }

    #[test]
    fn test_sort_key_parts() {
        let comment = item("COMMENT#2025-01-15T09:30:00Z#c-42");
        assert_eq!(comment.comment_id(), Some("c-42"));
        assert_eq!(
            comment.created_at(),
            Some(Utc.with_ymd_and_hms(2025, 1, 15, 9, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_malformed_sort_key() {
        let comment = item("COMMENT");
        assert_eq!(comment.comment_id(), None);
        assert_eq!(comment.created_at(), None);
    }

    #[test]
    fn test_keys_serialize_uppercase() {
        let value = serde_json::to_value(item("COMMENT#x#y")).unwrap();
        assert_eq!(value["PK"], "TROUBLE#t1");
        assert_eq!(value["SK"], "COMMENT#x#y");
    }

    #[test]
    fn test_new_comment_requires_text() {
        assert_eq!(
            NewComment::new("t1", " ").validate(),
            Err(ValidationError::Required { field: "comment" })
        );
    }
}
