//! End-to-end tests for the `inkpost` binary.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// An address nothing listens on; commands that must not reach the network use it.
const UNREACHABLE: &str = "http://127.0.0.1:9/";

fn inkpost(session_file: &Path, api_url: &str) -> Command {
    let mut cmd = cargo_bin_cmd!("inkpost");
    cmd.env("INKPOST_SESSION_FILE", session_file)
        .env("INKPOST_API_URL", api_url)
        .env_remove("INKPOST_HTTP_TIMEOUT_SECS")
        .env_remove("SENTRY_DSN")
        .env_remove("RUST_LOG");
    cmd
}

fn session_file(dir: &TempDir, contents: Option<serde_json::Value>) -> PathBuf {
    let path = dir.path().join("session.json");
    if let Some(contents) = contents {
        fs::write(&path, contents.to_string()).unwrap();
    }
    path
}

fn post_json(id: u64, owner: u64) -> serde_json::Value {
    json!({
        "id": id,
        "title": "Hello",
        "content": "First post",
        "userId": owner,
        "createdAt": "2024-05-01T10:00:00Z",
        "updatedAt": "2024-05-01T10:00:00Z",
    })
}

#[test]
fn test_help_shows_all_commands() {
    cargo_bin_cmd!("inkpost")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("register"))
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("users"))
        .stdout(predicate::str::contains("post"));
}

#[test]
fn test_status_without_session() {
    let dir = TempDir::new().unwrap();
    inkpost(&session_file(&dir, None), UNREACHABLE)
        .arg("status")
        .assert()
        .success()
        .stdout("Status: Signed out\n");
}

#[test]
fn test_status_reads_stored_session() {
    let dir = TempDir::new().unwrap();
    let file = session_file(
        &dir,
        Some(json!({"userToken": "t", "userIsAdmin": "true", "userId": "5"})),
    );

    inkpost(&file, UNREACHABLE)
        .arg("status")
        .assert()
        .success()
        .stdout("Status: Signed in (admin)\nUser ID: 5\n");
}

#[test]
fn test_corrupt_session_file_means_signed_out() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("session.json");
    fs::write(&file, "{broken").unwrap();

    inkpost(&file, UNREACHABLE)
        .arg("status")
        .assert()
        .success()
        .stdout("Status: Signed out\n");
}

#[test]
fn test_invalid_api_url_is_reported() {
    let dir = TempDir::new().unwrap();
    inkpost(&session_file(&dir, None), "not a url")
        .arg("status")
        .assert()
        .failure()
        .stdout(predicate::str::contains("INKPOST_API_URL"));
}

#[test]
fn test_post_create_requires_login() {
    let dir = TempDir::new().unwrap();
    inkpost(&session_file(&dir, None), UNREACHABLE)
        .args(["post", "create", "-t", "Hi", "-c", "There"])
        .assert()
        .failure()
        .stdout("Error: You need to log in first\n");
}

#[test]
fn test_blank_title_is_rejected_before_any_request() {
    let dir = TempDir::new().unwrap();
    let file = session_file(&dir, Some(json!({"userToken": "t", "userId": "1"})));

    inkpost(&file, UNREACHABLE)
        .args(["post", "create", "-t", "   ", "-c", "There"])
        .assert()
        .failure()
        .stdout("Error: Title is required\n");
}

#[test]
fn test_users_refused_for_members() {
    let dir = TempDir::new().unwrap();
    let file = session_file(
        &dir,
        Some(json!({"userToken": "t", "userIsAdmin": "false", "userId": "1"})),
    );

    inkpost(&file, UNREACHABLE)
        .arg("users")
        .assert()
        .failure()
        .stdout("Error: This section is reserved for administrators\n");
}

#[test]
fn test_delete_can_be_cancelled() {
    let dir = TempDir::new().unwrap();
    let file = session_file(&dir, Some(json!({"userToken": "t", "userId": "1"})));

    inkpost(&file, UNREACHABLE)
        .args(["post", "delete", "3"])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout("Delete post #3? [y/N] Cancelled.\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_then_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/user/login"))
        .and(body_json(json!({"email": "a@x.com", "password": "p"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "tok-9"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/user/monprofil"))
        .and(header("authorization", "Bearer tok-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"id": 4, "name": "A", "email": "a@x.com", "isAdmin": false}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let file = session_file(&dir, None);

    inkpost(&file, &server.uri())
        .args(["login", "-e", "a@x.com", "-p", "p"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in."))
        .stdout(predicate::str::contains("Status: Signed in\n"));

    inkpost(&file, UNREACHABLE)
        .arg("status")
        .assert()
        .success()
        .stdout("Status: Signed in\nUser ID: 4\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_failure_shows_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/user/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Bad credentials"})))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let file = session_file(&dir, None);

    inkpost(&file, &server.uri())
        .args(["login", "-e", "a@x.com", "-p", "wrong"])
        .assert()
        .failure()
        .stdout(predicate::str::starts_with("Error: Bad credentials\n"));

    assert!(!file.exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_api_url_flag_overrides_environment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/post/12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": post_json(12, 2)})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let file = session_file(&dir, Some(json!({"userToken": "t", "userId": "1"})));

    inkpost(&file, UNREACHABLE)
        .args(["--api-url", &server.uri(), "post", "show", "12"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("#12  Hello\n"))
        .stdout(predicate::str::contains("You can").not());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_expired_token_suggests_login() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/monprofil"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let file = session_file(&dir, Some(json!({"userToken": "old", "userId": "1"})));

    inkpost(&file, &server.uri())
        .arg("profile")
        .assert()
        .failure()
        .stdout(
            "Error: Unable to load your profile\nHint: run `inkpost login` to sign in again.\n",
        );
}

#[test]
fn test_invalid_timeout_is_reported() {
    let dir = TempDir::new().unwrap();
    inkpost(&session_file(&dir, None), UNREACHABLE)
        .env("INKPOST_HTTP_TIMEOUT_SECS", "soon")
        .arg("status")
        .assert()
        .failure()
        .stdout(predicate::str::contains("INKPOST_HTTP_TIMEOUT_SECS"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_replaces_corrupt_session_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/user/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "tok-3"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/user/monprofil"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"id": 3, "name": "C", "email": "c@x.com", "isAdmin": false}
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let file = dir.path().join("session.json");
    fs::write(&file, "{broken").unwrap();

    inkpost(&file, &server.uri())
        .args(["login", "-e", "c@x.com", "-p", "p"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in."));

    inkpost(&file, UNREACHABLE)
        .arg("status")
        .assert()
        .success()
        .stdout("Status: Signed in\nUser ID: 3\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_edit_one_field_fetches_post_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/post/11"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": post_json(11, 2)})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/post/updateOwnPost/11"))
        .and(body_json(json!({"title": "Renamed", "content": "First post"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let file = session_file(&dir, Some(json!({"userToken": "t", "userId": "2"})));

    inkpost(&file, &server.uri())
        .args(["post", "edit", "11", "-t", "Renamed"])
        .assert()
        .success()
        .stdout("Post updated.\n");
}
