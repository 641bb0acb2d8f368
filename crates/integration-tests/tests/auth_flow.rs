//! Integration tests for registration and login.

use inkpost_client::services::{ServiceError, auth};
use inkpost_client::storage::keys;
use inkpost_client::KeyValueStore;
use inkpost_core::{LoginForm, RegisterForm, SessionState, ValidationError};
use inkpost_integration_tests::TestContext;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

fn register_form(name: &str, email: &str, password: &str) -> RegisterForm {
    RegisterForm {
        name: name.to_string(),
        email: email.to_string(),
        password: SecretString::from(password),
    }
}

fn login_form(email: &str, password: &str) -> LoginForm {
    LoginForm {
        email: email.to_string(),
        password: SecretString::from(password),
    }
}

#[tokio::test]
async fn test_register_then_login() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/user/new"))
        .and(body_json(json!({"name": "A", "email": "a@x.com", "password": "p"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"message": "created"})))
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/user/login"))
        .and(body_json(json!({"email": "a@x.com", "password": "p"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "tok-a"})))
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/user/monprofil"))
        .and(header("authorization", "Bearer tok-a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"id": "u-1", "name": "A", "email": "a@x.com"}
        })))
        .expect(1)
        .mount(&ctx.server)
        .await;

    ctx.sessions.bootstrap().await;
    auth::register(ctx.sessions.api(), &register_form("A", "a@x.com", "p"))
        .await
        .unwrap();
    let session = auth::login(&ctx.sessions, &login_form("a@x.com", "p"))
        .await
        .unwrap();

    assert_eq!(session.state(), SessionState::Authenticated { is_admin: false });
    assert_eq!(
        ctx.store.get(keys::USER_TOKEN).await.unwrap().as_deref(),
        Some("tok-a")
    );
    assert_eq!(
        ctx.store.get(keys::USER_IS_ADMIN).await.unwrap().as_deref(),
        Some("false")
    );
}

#[tokio::test]
async fn test_register_with_blank_field_sends_nothing() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&ctx.server)
        .await;

    let err = auth::register(ctx.sessions.api(), &register_form("A", "  ", "p"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::MissingFields)
    ));
    assert_eq!(err.alert_message("Unable to create an account"), "Please fill in all fields");
}

#[tokio::test]
async fn test_register_rejection_shows_server_message() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/user/new"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({"message": "Email already registered"})),
        )
        .mount(&ctx.server)
        .await;

    let err = auth::register(ctx.sessions.api(), &register_form("A", "a@x.com", "p"))
        .await
        .unwrap_err();

    assert_eq!(
        err.alert_message("Unable to create an account"),
        "Email already registered"
    );
}

#[tokio::test]
async fn test_failed_login_leaves_session_untouched() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/user/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid credentials"})))
        .mount(&ctx.server)
        .await;

    ctx.sessions.bootstrap().await;
    let err = auth::login(&ctx.sessions, &login_form("a@x.com", "nope"))
        .await
        .unwrap_err();

    assert!(err.is_auth_rejection());
    assert_eq!(err.alert_message("Unable to log in"), "Invalid credentials");
    assert_eq!(ctx.sessions.state().await, SessionState::Unauthenticated);
    assert!(ctx.store.is_empty().await);
}

#[tokio::test]
async fn test_logout_after_login() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/user/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "tok"})))
        .mount(&ctx.server)
        .await;
    ctx.mount_profile(1, true).await;

    ctx.sessions.bootstrap().await;
    auth::login(&ctx.sessions, &login_form("a@x.com", "p"))
        .await
        .unwrap();

    let session = auth::logout(&ctx.sessions).await;
    assert_eq!(session.state(), SessionState::Unauthenticated);
    assert!(ctx.store.is_empty().await);
}
