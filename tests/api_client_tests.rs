//! Integration tests for the authenticated client and the typed resources.

mod common;

use common::{context_for, id_token};
use console_session::resources::{
    CommentApi, NewComment, NewRole, NewTrouble, NewUser, Priority, RoleApi, TodoApi, TodoDraft,
    TodoUpdate, TroubleApi, UserApi, ValidationError,
};
use console_session::{ApiError, Session};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn signed_in(server: &MockServer) -> console_session::SessionContext<console_session::CognitoProvider> {
    let context = context_for(server);
    context
        .store()
        .save(&Session::new("access", "refresh", id_token("alice", 3600)))
        .unwrap();
    context
}

// === Unauthenticated calls ===

#[tokio::test]
async fn test_todos_without_token_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/prod/todos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let context = context_for(&server);
    let todos = TodoApi::new(context.api_client().unwrap());
    let error = todos.list().await.unwrap_err();
    assert!(matches!(error, ApiError::Unauthorized));
    assert_eq!(error.status(), 401);
}

// === Todos ===

#[tokio::test]
async fn test_list_todos_normalizes_missing_fields() {
    let server = MockServer::start().await;
    let context = signed_in(&server).await;
    let bearer = format!("Bearer {}", context.store().id_token().unwrap());
    Mock::given(method("GET"))
        .and(path("/prod/todos"))
        .and(header("Authorization", bearer.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "1", "title": "Buy milk" },
            { "id": "2", "title": "Ship", "priority": "high", "is_completed": true, "tags": ["work"] }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let todos = TodoApi::new(context.api_client().unwrap()).list().await.unwrap();
    assert_eq!(todos.len(), 2);
    assert_eq!(todos[0].priority, Priority::Low);
    assert!(!todos[0].is_completed);
    assert!(todos[0].tags.is_empty());
    assert_eq!(todos[1].priority, Priority::High);
}

#[tokio::test]
async fn test_create_todo_sends_validated_draft() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/prod/todos"))
        .and(body_json(json!({
            "title": "Write report",
            "due_date": "2025-03-31",
            "priority": "medium",
            "tags": ["work"]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "7",
            "title": "Write report",
            "due_date": "2025-03-31",
            "priority": "medium",
            "tags": ["work"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let context = signed_in(&server).await;
    let draft = TodoDraft::new("Write report")
        .due_date("2025-03-31")
        .priority(Priority::Medium)
        .tag("work");
    let created = TodoApi::new(context.api_client().unwrap())
        .create(&draft)
        .await
        .unwrap();
    assert_eq!(created.id, "7");
}

#[tokio::test]
async fn test_invalid_draft_is_not_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let context = signed_in(&server).await;
    let error = TodoApi::new(context.api_client().unwrap())
        .create(&TodoDraft::new("Write").due_date("tomorrow"))
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        ApiError::Validation(ValidationError::InvalidDate { .. })
    ));
    assert_eq!(error.status(), 400);
}

#[tokio::test]
async fn test_update_and_delete_todo() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/prod/todos/7"))
        .and(body_json(json!({ "is_completed": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "7",
            "title": "Write report",
            "is_completed": true
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/prod/todos/7"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let context = signed_in(&server).await;
    let todos = TodoApi::new(context.api_client().unwrap());
    let update = TodoUpdate {
        is_completed: Some(true),
        ..TodoUpdate::default()
    };
    assert!(todos.update("7", &update).await.unwrap().is_completed);
    todos.delete("7").await.unwrap();
}

#[tokio::test]
async fn test_missing_todo_carries_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/prod/todos/404"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&server)
        .await;

    let context = signed_in(&server).await;
    let error = TodoApi::new(context.api_client().unwrap())
        .get("404")
        .await
        .unwrap_err();
    assert_eq!(error.status(), 404);
    assert_eq!(error.to_string(), "API request failed: 404 Not Found");
}

#[tokio::test]
async fn test_expired_backend_session_is_session_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let context = signed_in(&server).await;
    let error = TodoApi::new(context.api_client().unwrap())
        .list()
        .await
        .unwrap_err();
    assert!(error.is_session_error());
}

// === Troubles ===

#[tokio::test]
async fn test_trouble_pages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/prod/troubles"))
        .and(query_param("nextToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "item_id": "t3", "category": "vpn", "message": "slow" }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/prod/troubles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                { "item_id": "t1", "category": "network", "message": "down" },
                { "item_id": "t2", "category": "mail", "message": "bounced" }
            ],
            "nextToken": "page-2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let context = signed_in(&server).await;
    let troubles = TroubleApi::new(context.api_client().unwrap());

    let first = troubles.list(None).await.unwrap();
    assert_eq!(first.items.len(), 2);
    let second = troubles
        .list(first.next_token.as_deref())
        .await
        .unwrap();
    assert_eq!(second.items[0].item_id, "t3");
    assert!(!second.has_next());
}

#[tokio::test]
async fn test_create_trouble() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/prod/troubles"))
        .and(body_json(json!({ "category": "network", "message": "VPN is down" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "message": "Trouble created",
            "item_id": "t9",
            "category": "network"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let context = signed_in(&server).await;
    let created = TroubleApi::new(context.api_client().unwrap())
        .create(&NewTrouble::new("network", "VPN is down"))
        .await
        .unwrap();
    assert_eq!(created.item_id, "t9");
}

// === Comments ===

#[tokio::test]
async fn test_comments_use_the_comments_backend() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/comments-api/comments"))
        .and(query_param("trouble_id", "t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "PK": "TROUBLE#t1",
            "SK": "COMMENT#2025-01-15T09:30:00Z#c1",
            "user_id": "alice",
            "comment": "seen it too"
        }])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/comments-api/comments"))
        .and(body_json(json!({ "trouble_id": "t1", "comment": "fixed" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "PK": "TROUBLE#t1",
            "SK": "COMMENT#2025-01-15T10:00:00Z#c2",
            "user_id": "alice",
            "comment": "fixed"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let context = signed_in(&server).await;
    let comments = CommentApi::new(context.comments_client().unwrap());

    let listed = comments.list("t1").await.unwrap();
    assert_eq!(listed[0].comment_id(), Some("c1"));

    let created = comments
        .create(&NewComment::new("t1", "  fixed  "))
        .await
        .unwrap();
    assert_eq!(created.comment_id(), Some("c2"));
}

// === Users and roles ===

#[tokio::test]
async fn test_users_list_and_create() {
    let server = MockServer::start().await;
    let context = signed_in(&server).await;
    let bearer = format!("Bearer {}", context.store().id_token().unwrap());
    Mock::given(method("GET"))
        .and(path("/prod/users"))
        .and(header("Authorization", bearer.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [{
                "user_id": "u1",
                "username": "bob",
                "email": "bob@example.com",
                "created_at": "2025-01-15T09:30:00Z",
                "updated_at": "2025-01-15T09:30:00Z"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/prod/users"))
        .and(body_json(json!({
            "username": "carol",
            "email": "carol@example.com",
            "password": "Secr3tPass"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "message": "User created",
            "username": "carol"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let users = UserApi::new(context.api_client().unwrap());

    let listed = users.list().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].email, "bob@example.com");

    let created = users
        .create(&NewUser::new("carol", "carol@example.com", "Secr3tPass"))
        .await
        .unwrap();
    assert_eq!(created["username"], "carol");
}

#[tokio::test]
async fn test_blank_user_is_not_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let context = signed_in(&server).await;
    let error = UserApi::new(context.api_client().unwrap())
        .create(&NewUser::new("carol", "carol@example.com", ""))
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        ApiError::Validation(ValidationError::Required { field: "password" })
    ));
}

#[tokio::test]
async fn test_roles_list_and_create() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/prod/roles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "roles": [{
                "role_id": "r1",
                "name": "admin",
                "description": "Full access",
                "created_at": "2025-01-15T09:30:00Z",
                "updated_at": "2025-01-15T09:30:00Z"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/prod/roles"))
        .and(body_json(json!({ "name": "viewer", "description": "Read only" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "role_id": "r2" })))
        .expect(1)
        .mount(&server)
        .await;

    let context = signed_in(&server).await;
    let roles = RoleApi::new(context.api_client().unwrap());

    let listed = roles.list().await.unwrap();
    assert_eq!(listed[0].name, "admin");
    assert_eq!(listed[0].description, "Full access");

    let created = roles
        .create(&NewRole::new("viewer", "Read only"))
        .await
        .unwrap();
    assert_eq!(created["role_id"], "r2");
}
