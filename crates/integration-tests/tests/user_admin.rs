//! Integration tests for the profile view and the admin user list.

use inkpost_client::ServiceError;
use inkpost_client::services::users;
use inkpost_client::storage::keys;
use inkpost_client::KeyValueStore;
use inkpost_core::SessionState;
use inkpost_integration_tests::TestContext;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_admin_lists_users() {
    let ctx = TestContext::with_entries(&[
        (keys::USER_TOKEN, "tok"),
        (keys::USER_IS_ADMIN, "true"),
        (keys::USER_ID, "1"),
    ])
    .await;
    Mock::given(method("GET"))
        .and(path("/user/all"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"id": 1, "name": "Ada", "email": "ada@x.com", "isAdmin": true},
                {"id": 2, "name": "Bob", "email": "bob@x.com", "isAdmin": false},
                {"id": 3, "name": "Cy", "email": "cy@x.com"},
            ]
        })))
        .expect(1)
        .mount(&ctx.server)
        .await;

    ctx.sessions.bootstrap().await;
    let list = users::list_users(&ctx.sessions).await.unwrap();

    assert_eq!(list.len(), 3);
    assert_eq!(list.iter().filter(|u| u.is_admin).count(), 1);
}

#[tokio::test]
async fn test_member_is_refused_without_request() {
    let ctx = TestContext::with_entries(&[
        (keys::USER_TOKEN, "tok"),
        (keys::USER_IS_ADMIN, "false"),
        (keys::USER_ID, "2"),
    ])
    .await;
    ctx.sessions.bootstrap().await;

    let err = users::list_users(&ctx.sessions).await.unwrap_err();
    assert!(matches!(err, ServiceError::AdminRequired));
    assert!(ctx.request_paths().await.is_empty());
}

#[tokio::test]
async fn test_server_still_enforces_admin_list() {
    // A stale cached flag lets the request through; the server refuses it
    let ctx = TestContext::with_entries(&[(keys::USER_TOKEN, "tok"), (keys::USER_IS_ADMIN, "true")]).await;
    Mock::given(method("GET"))
        .and(path("/user/all"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"message": "Admins only"})))
        .mount(&ctx.server)
        .await;

    ctx.sessions.bootstrap().await;
    let err = users::list_users(&ctx.sessions).await.unwrap_err();

    assert!(err.is_auth_rejection());
    assert_eq!(err.alert_message("Unable to load users"), "Admins only");
    assert_eq!(
        ctx.sessions.state().await,
        SessionState::Authenticated { is_admin: true }
    );
}

#[tokio::test]
async fn test_profile_refreshes_cached_flag() {
    let ctx = TestContext::with_entries(&[(keys::USER_TOKEN, "tok"), (keys::USER_IS_ADMIN, "false")]).await;
    ctx.mount_profile(4, true).await;

    ctx.sessions.bootstrap().await;
    let profile = users::profile(&ctx.sessions).await.unwrap();

    assert!(profile.is_admin);
    assert_eq!(profile.email, "user4@example.com");
    assert_eq!(
        ctx.sessions.state().await,
        SessionState::Authenticated { is_admin: true }
    );
    assert_eq!(
        ctx.store.get(keys::USER_IS_ADMIN).await.unwrap().as_deref(),
        Some("true")
    );
    assert_eq!(ctx.store.get(keys::USER_ID).await.unwrap().as_deref(), Some("4"));
}

#[tokio::test]
async fn test_profile_requires_sign_in() {
    let ctx = TestContext::new().await;
    ctx.sessions.bootstrap().await;

    let err = users::profile(&ctx.sessions).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotSignedIn));
}
