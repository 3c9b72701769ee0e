//! Error types for the authenticated REST client.
//!
//! # Error Handling
//!
//! - [`ApiError::Unauthorized`]: No ID token was stored; nothing was sent
//! - [`ApiError::Response`]: The backend answered with a non-2xx status
//! - [`ApiError::Transport`]: The backend could not be reached (status 500 by convention)
//! - [`ApiError::Decode`]: A 2xx body did not match the expected type
//! - [`ApiError::InvalidRequest`]: The request failed validation before sending
//! - [`ApiError::Validation`]: A resource payload failed client-side validation
//!
//! # Example
//!
//! ```rust,ignore
//! use console_session::clients::ApiError;
//!
//! match client.get::<Vec<Todo>>("/todos").await {
//!     Ok(todos) => println!("{} todos", todos.len()),
//!     Err(e) if e.is_session_error() => navigate("/login"),
//!     Err(e) => println!("Error {}: {}", e.status(), e),
//! }
//! ```

use thiserror::Error;

use crate::resources::ValidationError;

/// Error returned when an API request fails validation before it is sent.
///
/// # Example
///
/// ```rust
/// use console_session::clients::InvalidApiRequestError;
///
/// let error = InvalidApiRequestError::MissingBody {
///     method: "post".to_string(),
/// };
/// assert_eq!(error.to_string(), "Cannot use post without specifying data.");
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidApiRequestError {
    /// A POST or PUT request was made without a body.
    #[error("Cannot use {method} without specifying data.")]
    MissingBody {
        /// The HTTP method that requires a body.
        method: String,
    },

    /// The path is empty.
    #[error("Request path must not be empty.")]
    EmptyPath,

    /// The body could not be serialized to JSON.
    #[error("Request body could not be serialized: {message}")]
    InvalidBody {
        /// Description of the serialization failure.
        message: String,
    },
}

/// Errors returned by [`ApiClient`](crate::clients::ApiClient) and the typed
/// resources built on it.
///
/// # Thread Safety
///
/// `ApiError` is `Send + Sync`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No ID token is stored. Treat like an expired session.
    #[error("Not authenticated")]
    Unauthorized,

    /// The backend answered with a non-2xx status.
    ///
    /// The body is kept verbatim; it is not assumed to be structured.
    #[error("{message}")]
    Response {
        /// HTTP status code.
        status: u16,
        /// Human-readable message, e.g. `API request failed: 404 Not Found`.
        message: String,
        /// Raw response body.
        body: String,
    },

    /// The request could not be sent or the response could not be read.
    #[error("Network error: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },

    /// A 2xx response body could not be decoded.
    #[error("Failed to decode response ({status}): {message}")]
    Decode {
        /// HTTP status code.
        status: u16,
        /// Description of the decode failure.
        message: String,
    },

    /// The request failed validation before sending.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidApiRequestError),

    /// A resource payload failed client-side validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ApiError {
    /// Returns the status associated with the error.
    ///
    /// `Unauthorized` is 401 and `Transport` is 500 by convention; local
    /// validation failures are 400.
    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::Unauthorized => 401,
            Self::Response { status, .. } | Self::Decode { status, .. } => *status,
            Self::Transport { .. } => 500,
            Self::InvalidRequest(_) | Self::Validation(_) => 400,
        }
    }

    /// Returns `true` if the caller should send the user back to sign-in.
    #[must_use]
    pub const fn is_session_error(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::Response { status: 401, .. })
    }

    /// Returns `true` for transport failures.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport {
            message: error.to_string(),
        }
    }
}

// Verify ApiError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ApiError>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_conventions() {
        assert_eq!(ApiError::Unauthorized.status(), 401);
        assert_eq!(
            ApiError::Transport {
                message: "connection refused".to_string()
            }
            .status(),
            500
        );
        assert_eq!(
            ApiError::Response {
                status: 404,
                message: "API request failed: 404 Not Found".to_string(),
                body: String::new(),
            }
            .status(),
            404
        );
    }

    #[test]
    fn test_response_error_message() {
        let error = ApiError::Response {
            status: 403,
            message: "API request failed: 403 Forbidden".to_string(),
            body: "<html>denied</html>".to_string(),
        };
        assert_eq!(error.to_string(), "API request failed: 403 Forbidden");
    }

    #[test]
    fn test_session_errors() {
        assert!(ApiError::Unauthorized.is_session_error());
        assert!(ApiError::Response {
            status: 401,
            message: String::new(),
            body: String::new(),
        }
        .is_session_error());
        assert!(!ApiError::Transport {
            message: String::new()
        }
        .is_session_error());
    }

    #[test]
    fn test_transport_is_distinct_from_server_error() {
        let transport = ApiError::Transport {
            message: "dns failure".to_string(),
        };
        let server = ApiError::Response {
            status: 500,
            message: "API request failed: 500 Internal Server Error".to_string(),
            body: String::new(),
        };
        assert_eq!(transport.status(), server.status());
        assert!(transport.is_transport());
        assert!(!server.is_transport());
    }

    #[test]
    fn test_invalid_request_error_missing_body() {
        let error = InvalidApiRequestError::MissingBody {
            method: "put".to_string(),
        };
        assert_eq!(error.to_string(), "Cannot use put without specifying data.");
        assert_eq!(ApiError::from(error).status(), 400);
    }
}
