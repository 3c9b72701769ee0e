//! Scripted identity provider for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::auth::provider::{
    IdentityProvider, InitiateAuthResponse, ProviderError, ProviderTokens, UserAttributes,
};

type Queue<T> = Mutex<VecDeque<Result<T, ProviderError>>>;

/// Answers each operation from a queue of canned results.
#[derive(Default)]
pub struct ScriptedProvider {
    pub initiate: Queue<InitiateAuthResponse>,
    pub complete: Queue<ProviderTokens>,
    pub refresh: Queue<ProviderTokens>,
    pub user: Queue<UserAttributes>,
    pub calls: AtomicUsize,
    pub delay: Duration,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn push_initiate(&self, result: Result<InitiateAuthResponse, ProviderError>) {
        self.initiate.lock().unwrap().push_back(result);
    }

    pub fn push_complete(&self, result: Result<ProviderTokens, ProviderError>) {
        self.complete.lock().unwrap().push_back(result);
    }

    pub fn push_refresh(&self, result: Result<ProviderTokens, ProviderError>) {
        self.refresh.lock().unwrap().push_back(result);
    }

    pub fn push_user(&self, result: Result<UserAttributes, ProviderError>) {
        self.user.lock().unwrap().push_back(result);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn next<T>(&self, queue: &Queue<T>) -> Result<T, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let next = queue.lock().unwrap().pop_front();
        next.unwrap_or_else(|| {
            Err(ProviderError::Transport {
                message: "no scripted response".to_string(),
            })
        })
    }
}

pub fn tokens(access: &str, id: &str, refresh: Option<&str>) -> ProviderTokens {
    ProviderTokens {
        access_token: access.to_string(),
        id_token: id.to_string(),
        refresh_token: refresh.map(str::to_string),
        expires_in: Some(3600),
    }
}

pub fn rejected(code: &str, message: &str) -> ProviderError {
    ProviderError::Rejected {
        code: code.to_string(),
        message: message.to_string(),
    }
}

impl IdentityProvider for ScriptedProvider {
    async fn initiate_auth(
        &self,
        _username: &str,
        _password: &str,
    ) -> Result<InitiateAuthResponse, ProviderError> {
        self.next(&self.initiate).await
    }

    async fn complete_new_password(
        &self,
        _username: &str,
        _continuation: &str,
        _new_password: &str,
    ) -> Result<ProviderTokens, ProviderError> {
        self.next(&self.complete).await
    }

    async fn refresh_session(&self, _refresh_token: &str) -> Result<ProviderTokens, ProviderError> {
        self.next(&self.refresh).await
    }

    async fn get_user_attributes(&self, _access_token: &str) -> Result<UserAttributes, ProviderError> {
        self.next(&self.user).await
    }
}
