//! Cognito user pool implementation of [`IdentityProvider`].
//!
//! Every operation is a JSON `POST` to the pool endpoint, selected by the
//! `X-Amz-Target` header:
//!
//! | Operation | Target | Flow |
//! |-----------|--------|------|
//! | [`initiate_auth`](IdentityProvider::initiate_auth) | `InitiateAuth` | `USER_PASSWORD_AUTH` |
//! | [`complete_new_password`](IdentityProvider::complete_new_password) | `RespondToAuthChallenge` | `NEW_PASSWORD_REQUIRED` |
//! | [`refresh_session`](IdentityProvider::refresh_session) | `InitiateAuth` | `REFRESH_TOKEN_AUTH` |
//! | [`get_user_attributes`](IdentityProvider::get_user_attributes) | `GetUser` | |

use std::collections::BTreeMap;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{
    IdentityProvider, InitiateAuthResponse, ProviderError, ProviderTokens, UserAttributes,
    NEW_PASSWORD_REQUIRED,
};
use crate::config::{BaseUrl, ClientId, SessionConfig};

/// Content type of the Cognito JSON protocol.
pub const AMZ_JSON_CONTENT_TYPE: &str = "application/x-amz-json-1.1";

/// Prefix of every `X-Amz-Target` header value.
pub const TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";

/// Identity provider backed by a Cognito user pool app client.
///
/// The app client must allow `USER_PASSWORD_AUTH` and have no client secret.
///
/// # Thread Safety
///
/// `CognitoProvider` is `Send + Sync` and cheap to clone.
///
/// # Example
///
/// ```rust
/// use console_session::{CognitoProvider, ClientId, SessionConfig};
///
/// let config = SessionConfig::builder()
///     .client_id(ClientId::new("client").unwrap())
///     .build()
///     .unwrap();
/// let provider = CognitoProvider::new(&config);
/// assert_eq!(
///     provider.endpoint().as_ref(),
///     "https://cognito-idp.ap-northeast-1.amazonaws.com"
/// );
/// ```
#[derive(Clone, Debug)]
pub struct CognitoProvider {
    client: reqwest::Client,
    endpoint: BaseUrl,
    client_id: ClientId,
    timeout: Duration,
}

// Verify CognitoProvider is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<CognitoProvider>();
};

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthResponse {
    authentication_result: Option<AuthenticationResult>,
    challenge_name: Option<String>,
    session: Option<String>,
    #[serde(default)]
    challenge_parameters: BTreeMap<String, Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticationResult {
    access_token: String,
    id_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetUserResponse {
    username: String,
    #[serde(default)]
    user_attributes: Vec<AttributeType>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AttributeType {
    name: String,
    #[serde(default)]
    value: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    #[serde(rename = "__type", default)]
    error_type: Option<String>,
    #[serde(alias = "Message", default)]
    message: Option<String>,
}

impl From<AuthenticationResult> for ProviderTokens {
    fn from(result: AuthenticationResult) -> Self {
        Self {
            access_token: result.access_token,
            id_token: result.id_token,
            refresh_token: result.refresh_token,
            expires_in: result.expires_in,
        }
    }
}

impl AuthResponse {
    fn into_initiate(self) -> Result<InitiateAuthResponse, ProviderError> {
        if let Some(result) = self.authentication_result {
            return Ok(InitiateAuthResponse::Authenticated(result.into()));
        }

        let Some(name) = self.challenge_name else {
            return Err(ProviderError::MalformedResponse {
                message: "response has neither AuthenticationResult nor ChallengeName".to_string(),
            });
        };
        let session = self.session.ok_or_else(|| ProviderError::MalformedResponse {
            message: format!("challenge {name} has no Session"),
        })?;

        let parameters = self
            .challenge_parameters
            .into_iter()
            .map(|(key, value)| match value {
                Value::String(s) => (key, s),
                other => (key, other.to_string()),
            })
            .collect();

        Ok(InitiateAuthResponse::Challenge {
            name,
            session,
            parameters,
        })
    }

    fn into_tokens(self) -> Result<ProviderTokens, ProviderError> {
        match self.into_initiate()? {
            InitiateAuthResponse::Authenticated(tokens) => Ok(tokens),
            InitiateAuthResponse::Challenge { name, .. } => {
                Err(ProviderError::UnexpectedChallenge { name })
            }
        }
    }
}

impl CognitoProvider {
    /// Creates a provider for the configured app client and endpoint.
    #[must_use]
    pub fn new(config: &SessionConfig) -> Self {
        Self::with_client(config, reqwest::Client::new())
    }

    /// Creates a provider that sends requests through `client`.
    #[must_use]
    pub fn with_client(config: &SessionConfig, client: reqwest::Client) -> Self {
        Self {
            client,
            endpoint: config.provider_endpoint().clone(),
            client_id: config.client_id().clone(),
            timeout: config.provider_timeout(),
        }
    }

    /// Returns the provider endpoint.
    #[must_use]
    pub const fn endpoint(&self) -> &BaseUrl {
        &self.endpoint
    }

    /// Returns the timeout applied to each call.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn call<T: DeserializeOwned>(
        &self,
        operation: &str,
        body: Value,
    ) -> Result<T, ProviderError> {
        let request = self
            .client
            .post(self.endpoint.as_ref())
            .header("Content-Type", AMZ_JSON_CONTENT_TYPE)
            .header("X-Amz-Target", format!("{TARGET_PREFIX}.{operation}"))
            .body(body.to_string());

        let exchange = async {
            let response = request.send().await?;
            let status = response.status();
            let text = response.text().await?;
            Ok::<_, ProviderError>((status, text))
        };

        let (status, text) = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| ProviderError::Timeout {
                after: self.timeout,
            })??;

        if !status.is_success() {
            let error = Self::parse_error(status, &text);
            if let ProviderError::Rejected { code, .. } = &error {
                tracing::warn!(operation, code = %code, "Identity provider rejected request");
            }
            return Err(error);
        }

        serde_json::from_str(&text).map_err(|e| ProviderError::MalformedResponse {
            message: e.to_string(),
        })
    }

    fn parse_error(status: reqwest::StatusCode, body: &str) -> ProviderError {
        let parsed: Option<ErrorResponse> = serde_json::from_str(body).ok();
        let (error_type, message) = parsed
            .map(|e| (e.error_type, e.message))
            .unwrap_or_default();

        let code = error_type
            .as_deref()
            .map(|t| t.rsplit('#').next().unwrap_or(t).to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| format!("Http{}", status.as_u16()));

        let message = message.unwrap_or_else(|| {
            let reason = status.canonical_reason().unwrap_or("Unknown Error");
            format!("Identity provider returned {} {reason}", status.as_u16())
        });

        ProviderError::Rejected { code, message }
    }
}

impl IdentityProvider for CognitoProvider {
    async fn initiate_auth(
        &self,
        username: &str,
        password: &str,
    ) -> Result<InitiateAuthResponse, ProviderError> {
        let body = json!({
            "AuthFlow": "USER_PASSWORD_AUTH",
            "ClientId": self.client_id.as_ref(),
            "AuthParameters": {
                "USERNAME": username,
                "PASSWORD": password,
            },
        });
        let response: AuthResponse = self.call("InitiateAuth", body).await?;
        response.into_initiate()
    }

    async fn complete_new_password(
        &self,
        username: &str,
        continuation: &str,
        new_password: &str,
    ) -> Result<ProviderTokens, ProviderError> {
        let body = json!({
            "ChallengeName": NEW_PASSWORD_REQUIRED,
            "ClientId": self.client_id.as_ref(),
            "Session": continuation,
            "ChallengeResponses": {
                "USERNAME": username,
                "NEW_PASSWORD": new_password,
            },
        });
        let response: AuthResponse = self.call("RespondToAuthChallenge", body).await?;
        response.into_tokens()
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<ProviderTokens, ProviderError> {
        let body = json!({
            "AuthFlow": "REFRESH_TOKEN_AUTH",
            "ClientId": self.client_id.as_ref(),
            "AuthParameters": {
                "REFRESH_TOKEN": refresh_token,
            },
        });
        let response: AuthResponse = self.call("InitiateAuth", body).await?;
        response.into_tokens()
    }

    async fn get_user_attributes(&self, access_token: &str) -> Result<UserAttributes, ProviderError> {
        let body = json!({ "AccessToken": access_token });
        let response: GetUserResponse = self.call("GetUser", body).await?;
        Ok(UserAttributes {
            username: response.username,
            attributes: response
                .user_attributes
                .into_iter()
                .map(|a| (a.name, a.value))
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer, timeout: Duration) -> CognitoProvider {
        let config = SessionConfig::builder()
            .client_id(ClientId::new("test-client").unwrap())
            .provider_endpoint(BaseUrl::new(server.uri()).unwrap())
            .provider_timeout(timeout)
            .build()
            .unwrap();
        CognitoProvider::new(&config)
    }

    #[tokio::test]
    async fn test_initiate_auth_returns_tokens() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(header("X-Amz-Target", "AWSCognitoIdentityProviderService.InitiateAuth"))
            .and(header("Content-Type", AMZ_JSON_CONTENT_TYPE))
            .and(body_partial_json(json!({
                "AuthFlow": "USER_PASSWORD_AUTH",
                "ClientId": "test-client",
                "AuthParameters": { "USERNAME": "alice", "PASSWORD": "correct-pw" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "AuthenticationResult": {
                    "AccessToken": "access",
                    "IdToken": "id",
                    "RefreshToken": "refresh",
                    "ExpiresIn": 3600,
                    "TokenType": "Bearer"
                },
                "ChallengeParameters": {}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server, Duration::from_secs(5));
        let response = provider.initiate_auth("alice", "correct-pw").await.unwrap();

        match response {
            InitiateAuthResponse::Authenticated(tokens) => {
                assert_eq!(tokens.access_token, "access");
                assert_eq!(tokens.id_token, "id");
                assert_eq!(tokens.refresh_token.as_deref(), Some("refresh"));
                assert_eq!(tokens.expires_in, Some(3600));
            }
            other => panic!("Expected tokens, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_initiate_auth_returns_challenge() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ChallengeName": "NEW_PASSWORD_REQUIRED",
                "Session": "continuation-handle",
                "ChallengeParameters": {
                    "USER_ID_FOR_SRP": "bob",
                    "requiredAttributes": "[]",
                    "userAttributes": "{\"email\":\"bob@example.com\"}"
                }
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server, Duration::from_secs(5));
        let response = provider.initiate_auth("bob", "temp-pw").await.unwrap();

        match response {
            InitiateAuthResponse::Challenge {
                name,
                session,
                parameters,
            } => {
                assert_eq!(name, NEW_PASSWORD_REQUIRED);
                assert_eq!(session, "continuation-handle");
                assert_eq!(parameters.get("USER_ID_FOR_SRP").map(String::as_str), Some("bob"));
            }
            other => panic!("Expected challenge, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_error_type_prefix_is_stripped() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "__type": "com.amazonaws.cognito#NotAuthorizedException",
                "message": "Incorrect username or password."
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server, Duration::from_secs(5));
        let error = provider.initiate_auth("alice", "wrong").await.unwrap_err();

        match error {
            ProviderError::Rejected { code, message } => {
                assert_eq!(code, "NotAuthorizedException");
                assert_eq!(message, "Incorrect username or password.");
            }
            other => panic!("Expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_capitalized_message_field_is_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "__type": "InvalidPasswordException",
                "Message": "Password does not conform to policy"
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server, Duration::from_secs(5));
        let error = provider
            .complete_new_password("bob", "session", "weakpassword")
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            ProviderError::Rejected { ref code, ref message }
                if code == "InvalidPasswordException"
                    && message == "Password does not conform to policy"
        ));
    }

    #[tokio::test]
    async fn test_unstructured_error_body_uses_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
            .mount(&server)
            .await;

        let provider = provider_for(&server, Duration::from_secs(5));
        let error = provider.refresh_session("refresh").await.unwrap_err();

        match error {
            ProviderError::Rejected { code, message } => {
                assert_eq!(code, "Http503");
                assert!(message.contains("503"));
            }
            other => panic!("Expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_refresh_without_refresh_token_in_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "AuthFlow": "REFRESH_TOKEN_AUTH",
                "AuthParameters": { "REFRESH_TOKEN": "old-refresh" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "AuthenticationResult": {
                    "AccessToken": "new-access",
                    "IdToken": "new-id",
                    "ExpiresIn": 3600
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server, Duration::from_secs(5));
        let tokens = provider.refresh_session("old-refresh").await.unwrap();
        assert_eq!(tokens.id_token, "new-id");
        assert!(tokens.refresh_token.is_none());
    }

    #[tokio::test]
    async fn test_challenge_on_completion_is_unexpected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header(
                "X-Amz-Target",
                "AWSCognitoIdentityProviderService.RespondToAuthChallenge",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ChallengeName": "SOFTWARE_TOKEN_MFA",
                "Session": "next"
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server, Duration::from_secs(5));
        let error = provider
            .complete_new_password("bob", "session", "Str0ngPass")
            .await
            .unwrap_err();
        assert!(matches!(error, ProviderError::UnexpectedChallenge { ref name } if name == "SOFTWARE_TOKEN_MFA"));
    }

    #[tokio::test]
    async fn test_get_user_attributes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("X-Amz-Target", "AWSCognitoIdentityProviderService.GetUser"))
            .and(body_partial_json(json!({ "AccessToken": "access" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Username": "alice",
                "UserAttributes": [
                    { "Name": "email", "Value": "alice@example.com" },
                    { "Name": "custom:role", "Value": "admin" }
                ]
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server, Duration::from_secs(5));
        let user = provider.get_user_attributes("access").await.unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(
            user.attributes.get("custom:role").map(String::as_str),
            Some("admin")
        );
    }

    #[tokio::test]
    async fn test_malformed_success_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Unexpected": true })))
            .mount(&server)
            .await;

        let provider = provider_for(&server, Duration::from_secs(5));
        let error = provider.initiate_auth("alice", "pw").await.unwrap_err();
        assert!(matches!(error, ProviderError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_slow_provider_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let provider = provider_for(&server, Duration::from_millis(50));
        let error = provider.initiate_auth("alice", "pw").await.unwrap_err();
        assert!(matches!(error, ProviderError::Timeout { after } if after == Duration::from_millis(50)));
    }
}
