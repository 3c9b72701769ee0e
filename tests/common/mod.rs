//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use console_session::auth::SessionContext;
use console_session::storage::MemoryStorage;
use console_session::{BaseUrl, ClientId, CognitoProvider, SessionConfig};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;
use serde_json::{json, Value};
use wiremock::matchers::{header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";

/// JWT claims structure for creating test tokens
#[derive(Debug, Serialize)]
struct TestClaims {
    sub: String,
    #[serde(rename = "cognito:username")]
    username: String,
    email: String,
    token_use: &'static str,
    iat: i64,
    exp: i64,
}

/// Creates an ID token for `username` expiring `expires_in` seconds from now
pub fn id_token(username: &str, expires_in: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = TestClaims {
        sub: format!("sub-{username}"),
        username: username.to_string(),
        email: format!("{username}@example.com"),
        token_use: "id",
        iat: now,
        exp: now + expires_in,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(b"integration"),
    )
    .expect("Failed to encode JWT")
}

/// Creates a configuration pointing every endpoint at `server`
pub fn config_for(server: &MockServer) -> SessionConfig {
    SessionConfig::builder()
        .client_id(ClientId::new("test-client").unwrap())
        .provider_endpoint(BaseUrl::new(server.uri()).unwrap())
        .api_base_url(BaseUrl::new(format!("{}/prod", server.uri())).unwrap())
        .comments_api_url(BaseUrl::new(format!("{}/comments-api", server.uri())).unwrap())
        .build()
        .unwrap()
}

/// Creates a Cognito-backed context with in-memory storage
pub fn context_for(server: &MockServer) -> SessionContext<CognitoProvider> {
    SessionContext::cognito(config_for(server), MemoryStorage::new())
}

/// Creates a context sharing `storage`
pub fn context_with_storage(
    server: &MockServer,
    storage: Arc<MemoryStorage>,
) -> SessionContext<CognitoProvider> {
    let config = config_for(server);
    let provider = CognitoProvider::new(&config);
    SessionContext::new(config, provider, storage)
}

/// Mounts a Cognito operation answering with `status` and `body`
pub async fn mock_cognito(
    server: &MockServer,
    operation: &str,
    status: u16,
    body: Value,
    expected_calls: u64,
) {
    Mock::given(method("POST"))
        .and(header("X-Amz-Target", format!("{TARGET_PREFIX}.{operation}").as_str()))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// A successful authentication result
pub fn auth_result(access: &str, id: &str, refresh: Option<&str>) -> Value {
    let mut result = json!({
        "AccessToken": access,
        "IdToken": id,
        "ExpiresIn": 3600,
        "TokenType": "Bearer"
    });
    if let Some(refresh) = refresh {
        result["RefreshToken"] = json!(refresh);
    }
    json!({ "AuthenticationResult": result })
}

/// A Cognito error body
pub fn cognito_error(code: &str, message: &str) -> Value {
    json!({
        "__type": format!("com.amazonaws.cognito#{code}"),
        "message": message
    })
}
