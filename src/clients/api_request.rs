//! Request types for the authenticated REST client.

use std::collections::BTreeMap;
use std::fmt;

use crate::clients::errors::InvalidApiRequestError;

/// HTTP methods used by the REST backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    /// HTTP GET.
    Get,
    /// HTTP POST.
    Post,
    /// HTTP PUT.
    Put,
    /// HTTP DELETE.
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "get"),
            Self::Post => write!(f, "post"),
            Self::Put => write!(f, "put"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// A request to a REST backend, addressed by path relative to the base URL.
///
/// # Example
///
/// ```rust
/// use console_session::clients::{ApiRequest, HttpMethod};
/// use serde_json::json;
///
/// let request = ApiRequest::builder(HttpMethod::Post, "/todos")
///     .body(json!({"title": "Write tests"}))
///     .build()
///     .unwrap();
/// assert_eq!(request.path, "/todos");
///
/// assert!(ApiRequest::builder(HttpMethod::Put, "/todos/1").build().is_err());
/// ```
#[derive(Clone, Debug)]
pub struct ApiRequest {
    /// The HTTP method.
    pub method: HttpMethod,
    /// The path relative to the client's base URL.
    pub path: String,
    /// JSON body, if any.
    pub body: Option<serde_json::Value>,
    /// Query parameters.
    pub query: Option<BTreeMap<String, String>>,
    /// Additional headers.
    pub extra_headers: Option<BTreeMap<String, String>>,
}

impl ApiRequest {
    /// Creates a builder for a request.
    #[must_use]
    pub fn builder(method: HttpMethod, path: impl Into<String>) -> ApiRequestBuilder {
        ApiRequestBuilder::new(method, path)
    }

    /// Validates the request.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidApiRequestError`] if the path is empty or a POST/PUT
    /// request has no body.
    pub fn verify(&self) -> Result<(), InvalidApiRequestError> {
        if self.path.trim().is_empty() {
            return Err(InvalidApiRequestError::EmptyPath);
        }
        if matches!(self.method, HttpMethod::Post | HttpMethod::Put) && self.body.is_none() {
            return Err(InvalidApiRequestError::MissingBody {
                method: self.method.to_string(),
            });
        }
        Ok(())
    }
}

/// Builder for [`ApiRequest`].
#[derive(Debug)]
pub struct ApiRequestBuilder {
    method: HttpMethod,
    path: String,
    body: Option<serde_json::Value>,
    query: Option<BTreeMap<String, String>>,
    extra_headers: Option<BTreeMap<String, String>>,
}

impl ApiRequestBuilder {
    fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            query: None,
            extra_headers: None,
        }
    }

    /// Sets the JSON body.
    #[must_use]
    pub fn body(mut self, body: impl Into<serde_json::Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Adds a query parameter.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Builds and validates the request.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidApiRequestError`] if the request fails validation.
    pub fn build(self) -> Result<ApiRequest, InvalidApiRequestError> {
        let request = ApiRequest {
            method: self.method,
            path: self.path,
            body: self.body,
            query: self.query,
            extra_headers: self.extra_headers,
        };
        request.verify()?;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_http_method_display() {
        assert_eq!(HttpMethod::Get.to_string(), "get");
        assert_eq!(HttpMethod::Delete.to_string(), "delete");
    }

    #[test]
    fn test_builder_creates_get_request() {
        let request = ApiRequest::builder(HttpMethod::Get, "/troubles")
            .query_param("nextToken", "abc")
            .build()
            .unwrap();

        assert_eq!(request.method, HttpMethod::Get);
        assert!(request.body.is_none());
        assert_eq!(
            request.query.unwrap().get("nextToken").map(String::as_str),
            Some("abc")
        );
    }

    #[test]
    fn test_verify_requires_body_for_post_and_put() {
        assert!(matches!(
            ApiRequest::builder(HttpMethod::Post, "/todos").build(),
            Err(InvalidApiRequestError::MissingBody { method }) if method == "post"
        ));
        assert!(matches!(
            ApiRequest::builder(HttpMethod::Put, "/todos/1").build(),
            Err(InvalidApiRequestError::MissingBody { method }) if method == "put"
        ));
    }

    #[test]
    fn test_delete_needs_no_body() {
        assert!(ApiRequest::builder(HttpMethod::Delete, "/todos/1")
            .build()
            .is_ok());
    }

    #[test]
    fn test_empty_path_is_rejected() {
        assert_eq!(
            ApiRequest::builder(HttpMethod::Get, " ").build().unwrap_err(),
            InvalidApiRequestError::EmptyPath
        );
    }

    #[test]
    fn test_builder_with_headers() {
        let request = ApiRequest::builder(HttpMethod::Post, "/comments")
            .body(json!({"comment": "hi"}))
            .header("X-Request-Source", "console")
            .build()
            .unwrap();
        assert_eq!(
            request
                .extra_headers
                .unwrap()
                .get("X-Request-Source")
                .map(String::as_str),
            Some("console")
        );
    }
}
