//! Configuration types for the console session library.
//!
//! This module provides the configuration used to wire the identity provider,
//! token storage, route guard and REST clients together.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`SessionConfig`]: The main configuration struct holding all settings
//! - [`SessionConfigBuilder`]: A builder for constructing [`SessionConfig`] instances
//! - [`ClientId`], [`Region`], [`UserPoolId`], [`BaseUrl`]: Validated newtypes
//! - [`TokenLifetimes`]: Storage expiry for each persisted token
//! - [`RouteConfig`]: Login/default paths used by the route guard
//!
//! # Example
//!
//! ```rust
//! use console_session::{SessionConfig, ClientId, BaseUrl};
//!
//! let config = SessionConfig::builder()
//!     .client_id(ClientId::new("my-client-id").unwrap())
//!     .api_base_url(BaseUrl::new("https://api.example.com/prod").unwrap())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(
//!     config.provider_endpoint().as_ref(),
//!     "https://cognito-idp.ap-northeast-1.amazonaws.com"
//! );
//! ```

mod newtypes;

pub use newtypes::{BaseUrl, ClientId, Region, UserPoolId};

use std::time::Duration;

use crate::auth::PasswordPolicy;
use crate::error::ConfigError;

/// Default timeout for identity provider calls.
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound on how long a guard waits for storage to become ready.
pub const MAX_SETTLE_TIMEOUT: Duration = Duration::from_millis(100);

/// Storage expiry for each persisted token.
///
/// Access and ID tokens are short-lived; the refresh token outlives them so a
/// session can be renewed silently.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenLifetimes {
    /// Storage lifetime of the access token.
    pub access_token: chrono::Duration,
    /// Storage lifetime of the ID token.
    pub id_token: chrono::Duration,
    /// Storage lifetime of the refresh token.
    pub refresh_token: chrono::Duration,
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            access_token: chrono::Duration::days(1),
            id_token: chrono::Duration::days(1),
            refresh_token: chrono::Duration::days(30),
        }
    }
}

/// Route layout consulted by the [`AuthGuard`](crate::guard::AuthGuard).
///
/// Every path that is not public is protected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteConfig {
    login_path: String,
    default_path: String,
    public_paths: Vec<String>,
    redirect_param: String,
}

impl RouteConfig {
    /// Creates a route layout with the given sign-in and default views.
    ///
    /// The login path is always public.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRoutePath`] if either path does not
    /// start with `/`.
    pub fn new(
        login_path: impl Into<String>,
        default_path: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let login_path = Self::validate(login_path.into())?;
        let default_path = Self::validate(default_path.into())?;
        Ok(Self {
            public_paths: vec![login_path.clone()],
            login_path,
            default_path,
            redirect_param: "redirect".to_string(),
        })
    }

    /// Marks an additional path as public.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRoutePath`] if the path does not start with `/`.
    pub fn with_public_path(mut self, path: impl Into<String>) -> Result<Self, ConfigError> {
        let path = Self::validate(path.into())?;
        if !self.public_paths.contains(&path) {
            self.public_paths.push(path);
        }
        Ok(self)
    }

    /// Sets the query parameter that carries the return target.
    #[must_use]
    pub fn with_redirect_param(mut self, name: impl Into<String>) -> Self {
        self.redirect_param = name.into();
        self
    }

    /// Returns the sign-in view path.
    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Returns the default view path.
    #[must_use]
    pub fn default_path(&self) -> &str {
        &self.default_path
    }

    /// Returns the public paths.
    #[must_use]
    pub fn public_paths(&self) -> &[String] {
        &self.public_paths
    }

    /// Returns the name of the return-target query parameter.
    #[must_use]
    pub fn redirect_param(&self) -> &str {
        &self.redirect_param
    }

    /// Returns `true` if `path` requires an authenticated session.
    #[must_use]
    pub fn is_protected(&self, path: &str) -> bool {
        !self.public_paths.iter().any(|p| p == path)
    }

    fn validate(path: String) -> Result<String, ConfigError> {
        if path.starts_with('/') {
            Ok(path)
        } else {
            Err(ConfigError::InvalidRoutePath { path })
        }
    }
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            login_path: "/login".to_string(),
            default_path: "/".to_string(),
            public_paths: vec!["/login".to_string()],
            redirect_param: "redirect".to_string(),
        }
    }
}

/// Configuration for the session lifecycle and its REST clients.
///
/// # Thread Safety
///
/// `SessionConfig` is `Clone`, `Send`, and `Sync`, making it safe to share
/// across threads and async tasks.
///
/// # Example
///
/// ```rust
/// use console_session::{SessionConfig, ClientId, Region};
/// use std::time::Duration;
///
/// let config = SessionConfig::builder()
///     .client_id(ClientId::new("client").unwrap())
///     .region(Region::new("us-east-1").unwrap())
///     .provider_timeout(Duration::from_secs(5))
///     .build()
///     .unwrap();
///
/// assert_eq!(config.provider_timeout(), Duration::from_secs(5));
/// ```
#[derive(Clone, Debug)]
pub struct SessionConfig {
    client_id: ClientId,
    region: Region,
    user_pool_id: Option<UserPoolId>,
    provider_endpoint: BaseUrl,
    api_base_url: Option<BaseUrl>,
    comments_api_url: Option<BaseUrl>,
    token_lifetimes: TokenLifetimes,
    provider_timeout: Duration,
    settle_timeout: Duration,
    routes: RouteConfig,
    password_policy: PasswordPolicy,
}

impl SessionConfig {
    /// Creates a new builder for constructing a `SessionConfig`.
    #[must_use]
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::new()
    }

    /// Builds a configuration from process environment variables.
    ///
    /// See [`SessionConfig::from_lookup`] for the variables consulted.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a required variable is missing or a value
    /// fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a configuration from a variable lookup function.
    ///
    /// | Variable | Required | Purpose |
    /// |----------|----------|---------|
    /// | `COGNITO_CLIENT_ID` | yes | App client ID |
    /// | `AWS_REGION` | no | Provider region |
    /// | `COGNITO_USER_POOL_ID` | no | Pool ID (also implies the region) |
    /// | `COGNITO_ENDPOINT` | no | Provider endpoint override |
    /// | `API_BASE_URL` | no | Todo / troubles API base |
    /// | `COMMENTS_API_URL` | no | Comments API base |
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvironment`] listing every missing
    /// required variable, or the validation error of a malformed value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let Some(client_id) = get("COGNITO_CLIENT_ID") else {
            return Err(ConfigError::MissingEnvironment {
                names: vec!["COGNITO_CLIENT_ID"],
            });
        };

        let mut builder = Self::builder().client_id(ClientId::new(client_id)?);

        if let Some(pool) = get("COGNITO_USER_POOL_ID") {
            builder = builder.user_pool_id(UserPoolId::new(pool)?);
        }
        if let Some(region) = get("AWS_REGION") {
            builder = builder.region(Region::new(region)?);
        }
        if let Some(endpoint) = get("COGNITO_ENDPOINT") {
            builder = builder.provider_endpoint(BaseUrl::new(endpoint)?);
        }
        if let Some(url) = get("API_BASE_URL") {
            builder = builder.api_base_url(BaseUrl::new(url)?);
        }
        if let Some(url) = get("COMMENTS_API_URL") {
            builder = builder.comments_api_url(BaseUrl::new(url)?);
        }

        builder.build()
    }

    /// Returns the app client ID.
    #[must_use]
    pub const fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    /// Returns the provider region.
    #[must_use]
    pub const fn region(&self) -> &Region {
        &self.region
    }

    /// Returns the user pool ID, if configured.
    #[must_use]
    pub const fn user_pool_id(&self) -> Option<&UserPoolId> {
        self.user_pool_id.as_ref()
    }

    /// Returns the identity provider endpoint.
    #[must_use]
    pub const fn provider_endpoint(&self) -> &BaseUrl {
        &self.provider_endpoint
    }

    /// Returns the base URL of the todo / troubles API, if configured.
    #[must_use]
    pub const fn api_base_url(&self) -> Option<&BaseUrl> {
        self.api_base_url.as_ref()
    }

    /// Returns the base URL of the comments API, if configured.
    #[must_use]
    pub const fn comments_api_url(&self) -> Option<&BaseUrl> {
        self.comments_api_url.as_ref()
    }

    /// Returns the storage lifetimes for persisted tokens.
    #[must_use]
    pub const fn token_lifetimes(&self) -> TokenLifetimes {
        self.token_lifetimes
    }

    /// Returns the timeout applied to identity provider calls.
    #[must_use]
    pub const fn provider_timeout(&self) -> Duration {
        self.provider_timeout
    }

    /// Returns how long a guard waits for storage readiness.
    #[must_use]
    pub const fn settle_timeout(&self) -> Duration {
        self.settle_timeout
    }

    /// Returns the route layout.
    #[must_use]
    pub const fn routes(&self) -> &RouteConfig {
        &self.routes
    }

    /// Returns the client-side password policy.
    #[must_use]
    pub const fn password_policy(&self) -> &PasswordPolicy {
        &self.password_policy
    }
}

// Verify SessionConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<SessionConfig>();
};

/// Builder for constructing [`SessionConfig`] instances.
///
/// The only required field is `client_id`.
///
/// # Defaults
///
/// - `region`: the pool ID's region if set, otherwise `ap-northeast-1`
/// - `provider_endpoint`: `https://cognito-idp.{region}.amazonaws.com`
/// - `token_lifetimes`: access/ID 1 day, refresh 30 days
/// - `provider_timeout`: 10 seconds
/// - `settle_timeout`: 100 milliseconds (values above are clamped)
/// - `routes`: [`RouteConfig::default`]
/// - `password_policy`: [`PasswordPolicy::default`]
#[derive(Debug, Default)]
pub struct SessionConfigBuilder {
    client_id: Option<ClientId>,
    region: Option<Region>,
    user_pool_id: Option<UserPoolId>,
    provider_endpoint: Option<BaseUrl>,
    api_base_url: Option<BaseUrl>,
    comments_api_url: Option<BaseUrl>,
    token_lifetimes: Option<TokenLifetimes>,
    provider_timeout: Option<Duration>,
    settle_timeout: Option<Duration>,
    routes: Option<RouteConfig>,
    password_policy: Option<PasswordPolicy>,
}

impl SessionConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the app client ID (required).
    #[must_use]
    pub fn client_id(mut self, id: ClientId) -> Self {
        self.client_id = Some(id);
        self
    }

    /// Sets the provider region.
    #[must_use]
    pub fn region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    /// Sets the user pool ID.
    #[must_use]
    pub fn user_pool_id(mut self, id: UserPoolId) -> Self {
        self.user_pool_id = Some(id);
        self
    }

    /// Overrides the identity provider endpoint.
    #[must_use]
    pub fn provider_endpoint(mut self, endpoint: BaseUrl) -> Self {
        self.provider_endpoint = Some(endpoint);
        self
    }

    /// Sets the base URL of the todo / troubles API.
    #[must_use]
    pub fn api_base_url(mut self, url: BaseUrl) -> Self {
        self.api_base_url = Some(url);
        self
    }

    /// Sets the base URL of the comments API.
    #[must_use]
    pub fn comments_api_url(mut self, url: BaseUrl) -> Self {
        self.comments_api_url = Some(url);
        self
    }

    /// Sets the storage lifetimes for persisted tokens.
    #[must_use]
    pub const fn token_lifetimes(mut self, lifetimes: TokenLifetimes) -> Self {
        self.token_lifetimes = Some(lifetimes);
        self
    }

    /// Sets the timeout applied to identity provider calls.
    #[must_use]
    pub const fn provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = Some(timeout);
        self
    }

    /// Sets how long a guard waits for storage readiness.
    #[must_use]
    pub const fn settle_timeout(mut self, timeout: Duration) -> Self {
        self.settle_timeout = Some(timeout);
        self
    }

    /// Sets the route layout.
    #[must_use]
    pub fn routes(mut self, routes: RouteConfig) -> Self {
        self.routes = Some(routes);
        self
    }

    /// Sets the client-side password policy.
    #[must_use]
    pub const fn password_policy(mut self, policy: PasswordPolicy) -> Self {
        self.password_policy = Some(policy);
        self
    }

    /// Builds the [`SessionConfig`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `client_id` is not set,
    /// or [`ConfigError::InvalidUrl`] if the derived provider endpoint is invalid.
    pub fn build(self) -> Result<SessionConfig, ConfigError> {
        let client_id = self
            .client_id
            .ok_or(ConfigError::MissingRequiredField { field: "client_id" })?;

        let region = self
            .region
            .or_else(|| self.user_pool_id.as_ref().map(|p| p.region().clone()))
            .unwrap_or_default();

        let provider_endpoint = match self.provider_endpoint {
            Some(endpoint) => endpoint,
            None => BaseUrl::new(format!(
                "https://cognito-idp.{}.amazonaws.com",
                region.as_ref()
            ))?,
        };

        let settle_timeout = self
            .settle_timeout
            .unwrap_or(MAX_SETTLE_TIMEOUT)
            .min(MAX_SETTLE_TIMEOUT);

        Ok(SessionConfig {
            client_id,
            region,
            user_pool_id: self.user_pool_id,
            provider_endpoint,
            api_base_url: self.api_base_url,
            comments_api_url: self.comments_api_url,
            token_lifetimes: self.token_lifetimes.unwrap_or_default(),
            provider_timeout: self.provider_timeout.unwrap_or(DEFAULT_PROVIDER_TIMEOUT),
            settle_timeout,
            routes: self.routes.unwrap_or_default(),
            password_policy: self.password_policy.unwrap_or_default(),
        })
    }
}
