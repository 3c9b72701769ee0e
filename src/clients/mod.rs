//! HTTP client for the console's REST backends.
//!
//! # Overview
//!
//! - [`ApiClient`]: Sends requests with the stored ID token as bearer credential
//! - [`ApiRequest`]: A request to be sent, built with [`ApiRequestBuilder`]
//! - [`HttpMethod`]: Supported HTTP methods (GET, POST, PUT, DELETE)
//! - [`ApiError`]: Failures, with a status code for every variant
//!
//! # Example
//!
//! ```rust,ignore
//! use console_session::clients::{ApiClient, ApiRequest, HttpMethod};
//!
//! let client = context.api_client()?;
//! let request = ApiRequest::builder(HttpMethod::Get, "/troubles")
//!     .query_param("nextToken", "abc")
//!     .build()?;
//! let page: serde_json::Value = client.call(request).await?;
//! ```
//!
//! # Retry Behavior
//!
//! Requests are sent once. A 401 is returned to the caller, which decides
//! whether to refresh the session or send the user back to sign-in.

mod api_client;
mod api_request;
mod errors;

pub use api_client::{ApiClient, SDK_VERSION};
pub use api_request::{ApiRequest, ApiRequestBuilder, HttpMethod};
pub use errors::{ApiError, InvalidApiRequestError};
