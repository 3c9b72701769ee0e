//! # Console Session
//!
//! Client-side session lifecycle for a web console backed by an Amazon
//! Cognito user pool: sign-in, token persistence, silent renewal, route
//! guarding and authenticated calls to the console's REST backends.
//!
//! ## Overview
//!
//! This library provides:
//! - Type-safe configuration via [`SessionConfig`] and [`SessionConfigBuilder`]
//! - Username/password sign-in with the new-password challenge via [`auth::Authenticator`]
//! - Token persistence with per-token expiry via [`storage::TokenStore`]
//! - Silent, coalesced session renewal via [`auth::SessionRefresher`]
//! - An injectable session root with observable state via [`auth::SessionContext`]
//! - Route guarding with return targets via [`guard::AuthGuard`]
//! - A bearer-authenticated JSON client via [`clients::ApiClient`]
//! - Typed todo, trouble, comment, user and role resources via [`resources`]
//!
//! ## Quick Start
//!
//! ```rust
//! use console_session::{BaseUrl, ClientId, Region, SessionConfig};
//!
//! let config = SessionConfig::builder()
//!     .client_id(ClientId::new("your-app-client-id").unwrap())
//!     .region(Region::new("us-east-1").unwrap())
//!     .api_base_url(BaseUrl::new("https://api.example.com/prod").unwrap())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.region().as_ref(), "us-east-1");
//! ```
//!
//! ## Signing In
//!
//! ```rust,ignore
//! use console_session::auth::{AuthOutcome, ChallengeOutcome, Credentials, SessionContext};
//! use console_session::storage::FileStorage;
//!
//! let context = SessionContext::cognito(config, FileStorage::open("tokens.json")?);
//! context.initialize().await?;
//!
//! match context.sign_in(&Credentials::new("alice", "temp-password")).await {
//!     AuthOutcome::Success(_) => {}
//!     AuthOutcome::ChallengeRequired(challenge) => {
//!         let outcome = context
//!             .complete_new_password(challenge, "N3wPassword", "N3wPassword")
//!             .await;
//!         if let ChallengeOutcome::Retry { error, .. } = outcome {
//!             eprintln!("{error}");
//!         }
//!     }
//!     AuthOutcome::Failure(error) => eprintln!("{error}"),
//! }
//! ```
//!
//! ## Calling the Backends
//!
//! ```rust,ignore
//! use console_session::resources::{TroubleApi, NewTrouble};
//!
//! if !context.ensure_valid().await {
//!     // send the user to the login page
//! }
//! let troubles = TroubleApi::new(context.api_client()?);
//! let page = troubles.list(None).await?;
//! troubles.create(&NewTrouble::new("network", "VPN is down")).await?;
//! ```
//!
//! ## Logging
//!
//! The library emits [`tracing`] events and installs no subscriber. Tokens are
//! never logged.

pub mod auth;
pub mod clients;
pub mod config;
pub mod error;
pub mod guard;
pub mod resources;
pub mod storage;

// Re-export public types at crate root for convenience
pub use auth::provider::CognitoProvider;
pub use auth::{AuthError, AuthState, Credentials, Session, SessionContext, UserInfo};
pub use config::{
    BaseUrl, ClientId, Region, RouteConfig, SessionConfig, SessionConfigBuilder, TokenLifetimes,
    UserPoolId,
};
pub use error::ConfigError;

// Re-export client types
pub use clients::{ApiClient, ApiError, ApiRequest, HttpMethod};

// Re-export guard types
pub use guard::{AuthGuard, GuardDecision, GuardState};
