//! Route guarding for protected views.
//!
//! This module provides [`AuthGuard`], which decides whether a navigation
//! renders or redirects based on the ID token in the [`TokenStore`].
//!
//! # Overview
//!
//! - Protected path with a live ID token: [`GuardDecision::Render`]
//! - Protected path without one: redirect to the login path with the
//!   requested pathname as the return target
//! - Login path with a live ID token: redirect to the return target (or the
//!   default path) so a signed-in user is not asked to sign in again
//!
//! A mounted [`ProtectedView`] starts in [`GuardState::Checking`] and only
//! leaves it after the store's readiness signal fires or the settle timeout
//! elapses, whichever comes first.
//!
//! # Example
//!
//! ```rust
//! use console_session::config::{RouteConfig, TokenLifetimes};
//! use console_session::guard::{AuthGuard, GuardDecision};
//! use console_session::storage::{MemoryStorage, TokenStore};
//! use std::time::Duration;
//!
//! let store = TokenStore::new(MemoryStorage::new(), TokenLifetimes::default());
//! let guard = AuthGuard::new(store, RouteConfig::default(), Duration::from_millis(100));
//!
//! assert_eq!(
//!     guard.decide("/troubles"),
//!     GuardDecision::Redirect { location: "/login?redirect=%2Ftroubles".to_string() }
//! );
//! assert_eq!(guard.decide("/login"), GuardDecision::Render);
//! ```

use std::time::Duration;

use crate::config::{RouteConfig, SessionConfig, MAX_SETTLE_TIMEOUT};
use crate::storage::TokenStore;

/// Lifecycle of a mounted [`ProtectedView`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardState {
    /// Storage has not been consulted yet.
    Checking,
    /// A live session was found; the view renders.
    Authenticated,
    /// No live session; the view redirects and unmounts.
    Unauthenticated,
}

/// What the caller should do with a navigation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    /// Render the requested view.
    Render,
    /// Navigate to `location` instead.
    Redirect {
        /// Path (with query) to navigate to.
        location: String,
    },
}

/// Gate in front of protected views.
///
/// Cheap to clone; clones share the same token store.
#[derive(Clone, Debug)]
pub struct AuthGuard {
    store: TokenStore,
    routes: RouteConfig,
    settle_timeout: Duration,
}

impl AuthGuard {
    /// Creates a guard. `settle_timeout` is clamped to 100 ms.
    #[must_use]
    pub fn new(store: TokenStore, routes: RouteConfig, settle_timeout: Duration) -> Self {
        Self {
            store,
            routes,
            settle_timeout: settle_timeout.min(MAX_SETTLE_TIMEOUT),
        }
    }

    /// Creates a guard using the routes and settle timeout from `config`.
    #[must_use]
    pub fn from_config(store: TokenStore, config: &SessionConfig) -> Self {
        Self::new(store, config.routes().clone(), config.settle_timeout())
    }

    /// Returns the route layout.
    #[must_use]
    pub const fn routes(&self) -> &RouteConfig {
        &self.routes
    }

    /// Returns the settle timeout.
    #[must_use]
    pub const fn settle_timeout(&self) -> Duration {
        self.settle_timeout
    }

    /// Decides a navigation against the current store contents.
    ///
    /// `location` is a path with an optional query string and fragment.
    #[must_use]
    pub fn decide(&self, location: &str) -> GuardDecision {
        let (path, query) = split_location(location);
        let authenticated = self.store.has_valid_id_token();

        let decision = if path == self.routes.login_path() {
            if authenticated {
                GuardDecision::Redirect {
                    location: self.return_target(query),
                }
            } else {
                GuardDecision::Render
            }
        } else if !self.routes.is_protected(path) || authenticated {
            GuardDecision::Render
        } else {
            GuardDecision::Redirect {
                location: self.login_url(path),
            }
        };

        tracing::debug!(path, authenticated, decision = ?decision, "Guard decision");
        decision
    }

    /// Waits for storage to settle, then decides the navigation.
    ///
    /// Never waits longer than the settle timeout.
    pub async fn check(&self, location: &str) -> GuardDecision {
        self.settle().await;
        self.decide(location)
    }

    /// Mounts a protected view at `location` in the `Checking` state.
    #[must_use]
    pub fn mount(&self, location: impl Into<String>) -> ProtectedView {
        ProtectedView {
            guard: self.clone(),
            location: location.into(),
            state: GuardState::Checking,
        }
    }

    /// Returns the login URL carrying `path` as the return target.
    #[must_use]
    pub fn login_url(&self, path: &str) -> String {
        format!(
            "{}?{}={}",
            self.routes.login_path(),
            self.routes.redirect_param(),
            urlencoding::encode(path)
        )
    }

    async fn settle(&self) {
        if self.store.is_ready() {
            return;
        }
        if tokio::time::timeout(self.settle_timeout, self.store.ready())
            .await
            .is_err()
        {
            tracing::debug!(
                timeout_ms = self.settle_timeout.as_millis(),
                "Token store not ready; deciding with current contents"
            );
        }
    }

    /// Picks where a signed-in user visiting the login path goes.
    ///
    /// Only local absolute paths are honoured.
    fn return_target(&self, query: Option<&str>) -> String {
        let requested = query.and_then(|query| {
            let url = reqwest::Url::parse(&format!("http://localhost/?{query}")).ok()?;
            url.query_pairs()
                .find(|(key, _)| key == self.routes.redirect_param())
                .map(|(_, value)| value.into_owned())
        });

        match requested {
            Some(target)
                if target.starts_with('/')
                    && !target.starts_with("//")
                    && split_location(&target).0 != self.routes.login_path() =>
            {
                target
            }
            _ => self.routes.default_path().to_string(),
        }
    }
}

/// A protected view awaiting its first guard check.
#[derive(Debug)]
pub struct ProtectedView {
    guard: AuthGuard,
    location: String,
    state: GuardState,
}

impl ProtectedView {
    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> GuardState {
        self.state
    }

    /// Returns the location the view was mounted at.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Runs the guard check and moves to a terminal state.
    pub async fn resolve(&mut self) -> GuardDecision {
        let decision = self.guard.check(&self.location).await;
        self.state = match decision {
            GuardDecision::Render => GuardState::Authenticated,
            GuardDecision::Redirect { .. } => GuardState::Unauthenticated,
        };
        decision
    }
}

/// Splits `location` into its path and query, dropping any fragment.
fn split_location(location: &str) -> (&str, Option<&str>) {
    let location = location.split('#').next().unwrap_or(location);
    match location.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (location, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::session::test_tokens::jwt;
    use crate::auth::Session;
    use crate::config::TokenLifetimes;
    use crate::storage::MemoryStorage;
    use std::sync::Arc;

    fn guard_with(id_token: Option<String>) -> AuthGuard {
        let store = TokenStore::new(MemoryStorage::new(), TokenLifetimes::default());
        if let Some(id) = id_token {
            store.save(&Session::new("access", "refresh", id)).unwrap();
        }
        AuthGuard::new(store, RouteConfig::default(), Duration::from_millis(100))
    }

    // === Protected paths ===

    #[test]
    fn test_valid_token_renders_protected_path() {
        let guard = guard_with(Some(jwt("alice", 3600)));
        assert_eq!(guard.decide("/troubles"), GuardDecision::Render);
    }

    #[test]
    fn test_missing_token_redirects_with_return_target() {
        let guard = guard_with(None);
        assert_eq!(
            guard.decide("/troubles"),
            GuardDecision::Redirect {
                location: "/login?redirect=%2Ftroubles".to_string()
            }
        );
    }

    #[test]
    fn test_return_target_drops_query_and_fragment() {
        let guard = guard_with(None);
        assert_eq!(
            guard.decide("/troubles/42?tab=comments#top"),
            GuardDecision::Redirect {
                location: "/login?redirect=%2Ftroubles%2F42".to_string()
            }
        );
    }

    #[test]
    fn test_expired_token_redirects() {
        let guard = guard_with(Some(jwt("alice", -60)));
        assert!(matches!(
            guard.decide("/users"),
            GuardDecision::Redirect { .. }
        ));
    }

    #[test]
    fn test_public_paths_always_render() {
        let store = TokenStore::new(MemoryStorage::new(), TokenLifetimes::default());
        let routes = RouteConfig::default().with_public_path("/health").unwrap();
        let guard = AuthGuard::new(store, routes, Duration::from_millis(10));
        assert_eq!(guard.decide("/health"), GuardDecision::Render);
    }

    // === Login path ===

    #[test]
    fn test_login_with_session_redirects_to_default() {
        let guard = guard_with(Some(jwt("alice", 3600)));
        assert_eq!(
            guard.decide("/login"),
            GuardDecision::Redirect {
                location: "/".to_string()
            }
        );
    }

    #[test]
    fn test_login_with_session_honours_local_return_target() {
        let guard = guard_with(Some(jwt("alice", 3600)));
        assert_eq!(
            guard.decide("/login?redirect=%2Ftroubles"),
            GuardDecision::Redirect {
                location: "/troubles".to_string()
            }
        );
    }

    #[test]
    fn test_login_return_target_is_form_decoded() {
        let guard = guard_with(Some(jwt("alice", 3600)));
        assert_eq!(
            guard.decide("/login?from=menu&redirect=%2Freports+2025"),
            GuardDecision::Redirect {
                location: "/reports 2025".to_string()
            }
        );
    }

    #[test]
    fn test_login_ignores_external_return_target() {
        let guard = guard_with(Some(jwt("alice", 3600)));
        for location in [
            "/login?redirect=%2F%2Fevil.example.com",
            "/login?redirect=https%3A%2F%2Fevil.example.com",
            "/login?redirect=%2Flogin",
        ] {
            assert_eq!(
                guard.decide(location),
                GuardDecision::Redirect {
                    location: "/".to_string()
                },
                "location: {location}"
            );
        }
    }

    #[test]
    fn test_login_without_session_renders() {
        let guard = guard_with(None);
        assert_eq!(guard.decide("/login?redirect=%2Ftroubles"), GuardDecision::Render);
    }

    // === Mounting ===

    #[tokio::test]
    async fn test_mounted_view_starts_checking() {
        let guard = guard_with(Some(jwt("alice", 3600)));
        let mut view = guard.mount("/troubles");
        assert_eq!(view.state(), GuardState::Checking);

        assert_eq!(view.resolve().await, GuardDecision::Render);
        assert_eq!(view.state(), GuardState::Authenticated);
    }

    #[tokio::test]
    async fn test_unready_store_is_bounded_by_settle_timeout() {
        let (store, _signal) =
            TokenStore::pending(Arc::new(MemoryStorage::new()), TokenLifetimes::default());
        let guard = AuthGuard::new(store, RouteConfig::default(), Duration::from_secs(60));
        assert_eq!(guard.settle_timeout(), MAX_SETTLE_TIMEOUT);

        let started = tokio::time::Instant::now();
        let mut view = guard.mount("/troubles");
        let decision = view.resolve().await;

        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(matches!(decision, GuardDecision::Redirect { .. }));
        assert_eq!(view.state(), GuardState::Unauthenticated);
    }
}
