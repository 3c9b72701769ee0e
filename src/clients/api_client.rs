//! Authenticated client for the JSON REST backends.
//!
//! This module provides the [`ApiClient`] type, which attaches the stored ID
//! token as a bearer credential and maps failures to [`ApiError`].

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::clients::api_request::{ApiRequest, HttpMethod};
use crate::clients::errors::{ApiError, InvalidApiRequestError};
use crate::config::BaseUrl;
use crate::storage::TokenStore;

/// Library version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Client for a REST backend that accepts the ID token as a bearer credential.
///
/// The client:
/// - fails with [`ApiError::Unauthorized`] before sending anything when no ID
///   token is stored
/// - sends `Authorization: Bearer <id token>` and JSON `Accept`/`Content-Type`
/// - maps non-2xx responses to [`ApiError::Response`] without parsing the body
/// - never retries
///
/// # Thread Safety
///
/// `ApiClient` is `Send + Sync` and cheap to clone.
///
/// # Example
///
/// ```rust,ignore
/// use console_session::clients::ApiClient;
///
/// let client = ApiClient::new(BaseUrl::new("https://api.example.com/prod")?, store);
/// let todos: Vec<Todo> = client.get("/todos").await?;
/// ```
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: BaseUrl,
    store: TokenStore,
    user_agent: String,
}

// Verify ApiClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ApiClient>();
};

impl ApiClient {
    /// Creates a client for `base_url` reading tokens from `store`.
    #[must_use]
    pub fn new(base_url: BaseUrl, store: TokenStore) -> Self {
        Self::with_client(base_url, store, reqwest::Client::new())
    }

    /// Creates a client that sends requests through `client`.
    #[must_use]
    pub fn with_client(base_url: BaseUrl, store: TokenStore, client: reqwest::Client) -> Self {
        let rust_version = env!("CARGO_PKG_RUST_VERSION");
        Self {
            client,
            base_url,
            store,
            user_agent: format!("console-session v{SDK_VERSION} | Rust {rust_version}"),
        }
    }

    /// Returns the base URL.
    #[must_use]
    pub const fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// Sends `request` and decodes the JSON response.
    ///
    /// An empty 2xx body decodes as JSON `null`, so `()` and `Option<T>` can
    /// be used for endpoints that return nothing.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if:
    /// - the request fails validation (`InvalidRequest`)
    /// - no ID token is stored (`Unauthorized`, nothing is sent)
    /// - the backend cannot be reached (`Transport`)
    /// - the status is not 2xx (`Response`)
    /// - the body does not match `T` (`Decode`)
    pub async fn call<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        request.verify()?;

        let Some(id_token) = self.store.id_token() else {
            tracing::debug!(path = %request.path, "No ID token stored; request not sent");
            return Err(ApiError::Unauthorized);
        };

        let url = self.base_url.join(&request.path);
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
            HttpMethod::Put => self.client.put(&url),
            HttpMethod::Delete => self.client.delete(&url),
        };

        builder = builder
            .bearer_auth(&id_token)
            .header("Accept", "application/json")
            .header("User-Agent", &self.user_agent);

        if let Some(body) = &request.body {
            builder = builder
                .header("Content-Type", "application/json")
                .body(body.to_string());
        }
        if let Some(query) = &request.query {
            builder = builder.query(query);
        }
        if let Some(extra) = &request.extra_headers {
            for (key, value) in extra {
                builder = builder.header(key, value);
            }
        }

        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            // Keep the status even if the body read fails.
            let body = response.text().await.unwrap_or_default();
            let code = status.as_u16();
            let reason = status.canonical_reason().unwrap_or("Unknown Error");
            tracing::warn!(
                status = code,
                method = %request.method,
                path = %request.path,
                "API request failed"
            );
            return Err(ApiError::Response {
                status: code,
                message: format!("API request failed: {code} {reason}"),
                body,
            });
        }

        let body = response.text().await?;
        Self::decode(status.as_u16(), &body)
    }

    /// Sends a GET request.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::call`].
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.call(ApiRequest::builder(HttpMethod::Get, path).build()?)
            .await
    }

    /// Sends a POST request with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::call`].
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = ApiRequest::builder(HttpMethod::Post, path)
            .body(to_json(body)?)
            .build()?;
        self.call(request).await
    }

    /// Sends a PUT request with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::call`].
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = ApiRequest::builder(HttpMethod::Put, path)
            .body(to_json(body)?)
            .build()?;
        self.call(request).await
    }

    /// Sends a DELETE request.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::call`].
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.call(ApiRequest::builder(HttpMethod::Delete, path).build()?)
            .await
    }

    fn decode<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, ApiError> {
        let decoded = if body.trim().is_empty() {
            serde_json::from_value(serde_json::Value::Null)
        } else {
            serde_json::from_str(body)
        };
        decoded.map_err(|e| ApiError::Decode {
            status,
            message: e.to_string(),
        })
    }
}

fn to_json<B: Serialize + ?Sized>(body: &B) -> Result<serde_json::Value, InvalidApiRequestError> {
    serde_json::to_value(body).map_err(|e| InvalidApiRequestError::InvalidBody {
        message: e.to_string(),
    })
}
