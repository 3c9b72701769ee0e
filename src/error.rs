//! Configuration error types for the console session library.
//!
//! This module contains the error type returned while building a
//! [`SessionConfig`](crate::SessionConfig) or one of its validated newtypes.
//!
//! # Error Handling
//!
//! All configuration constructors return `Result<T, ConfigError>` to enable
//! fail-fast validation. Error messages are designed to be clear and actionable.
//!
//! # Example
//!
//! ```rust
//! use console_session::{ClientId, ConfigError};
//!
//! let result = ClientId::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyClientId)));
//! ```

use thiserror::Error;

/// Errors that can occur during configuration.
///
/// Each variant provides a clear, actionable error message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Client ID cannot be empty.
    #[error("Client ID cannot be empty. Please provide the user pool app client ID.")]
    EmptyClientId,

    /// Region is invalid.
    #[error("Invalid region '{region}'. Expected format: 'ap-northeast-1'.")]
    InvalidRegion {
        /// The invalid region that was provided.
        region: String,
    },

    /// User pool ID is invalid.
    #[error("Invalid user pool ID '{id}'. Expected format: '<region>_<id>'.")]
    InvalidUserPoolId {
        /// The invalid pool ID that was provided.
        id: String,
    },

    /// A base URL is invalid.
    #[error("Invalid URL '{url}'. Please provide an absolute http(s) URL (e.g., 'https://api.example.com/prod').")]
    InvalidUrl {
        /// The invalid URL that was provided.
        url: String,
    },

    /// A route path is invalid.
    #[error("Invalid route path '{path}'. Route paths must start with '/'.")]
    InvalidRoutePath {
        /// The invalid path that was provided.
        path: String,
    },

    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },

    /// Required environment variables are not set.
    #[error("Missing environment variables: {}", .names.join(", "))]
    MissingEnvironment {
        /// Every required variable that was missing or empty.
        names: Vec<&'static str>,
    },
}
