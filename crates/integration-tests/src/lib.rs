//! Integration tests for Inkpost.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p inkpost-integration-tests
//! ```
//!
//! Every test starts its own mock blog API with `wiremock`, so no server or
//! network access is needed.
//!
//! # Test Categories
//!
//! - `session_lifecycle` - Bootstrap, sign-in, sign-out and persistence
//! - `auth_flow` - Registration and login
//! - `post_dispatch` - Admin and owner endpoint selection for posts
//! - `user_admin` - Profile and the admin user list

use std::sync::Arc;

use inkpost_client::{ApiClient, KeyValueStore, MemoryStore, SessionManager, StorageError};
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A mock API server and a session manager pointed at it.
pub struct TestContext<S = MemoryStore> {
    pub server: MockServer,
    pub store: Arc<S>,
    pub sessions: SessionManager<S>,
}

impl TestContext<MemoryStore> {
    /// Context with an empty in-memory store.
    pub async fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new())).await
    }

    /// Context whose store already holds `entries`.
    pub async fn with_entries(entries: &[(&str, &str)]) -> Self {
        Self::with_store(Arc::new(MemoryStore::with_entries(entries.iter().copied()))).await
    }
}

impl<S: KeyValueStore> TestContext<S> {
    /// Context over an existing store. The session is still `Loading`.
    pub async fn with_store(store: Arc<S>) -> Self {
        let server = MockServer::start().await;
        let sessions = manager(&server, Arc::clone(&store));
        Self {
            server,
            store,
            sessions,
        }
    }

    /// A second manager over the same store, as after a process restart.
    #[must_use]
    pub fn restart(&self) -> SessionManager<S> {
        manager(&self.server, Arc::clone(&self.store))
    }

    /// Serve `GET /user/monprofil` with the given identity.
    pub async fn mount_profile(&self, id: u64, is_admin: bool) {
        Mock::given(method("GET"))
            .and(path("/user/monprofil"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "id": id,
                    "name": format!("User {id}"),
                    "email": format!("user{id}@example.com"),
                    "isAdmin": is_admin,
                }
            })))
            .mount(&self.server)
            .await;
    }

    /// Serve `GET /post/{id}` with a post owned by `owner`.
    pub async fn mount_post(&self, id: u64, owner: u64) {
        Mock::given(method("GET"))
            .and(path(format!("/post/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": post_json(id, owner)})))
            .mount(&self.server)
            .await;
    }

    /// Paths of every request the server has seen, in order.
    pub async fn request_paths(&self) -> Vec<String> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|r| format!("{} {}", r.method, r.url.path()))
            .collect()
    }
}

fn manager<S: KeyValueStore>(server: &MockServer, store: Arc<S>) -> SessionManager<S> {
    let api = ApiClient::with_base_url(&server.uri(), store).expect("mock server URI is a valid base");
    SessionManager::new(api)
}

/// A post as the API returns it.
#[must_use]
pub fn post_json(id: u64, owner: u64) -> Value {
    json!({
        "id": id,
        "title": format!("Post {id}"),
        "content": "Lorem ipsum",
        "userId": owner,
        "createdAt": "2024-05-01T10:00:00Z",
        "updatedAt": "2024-05-01T10:00:00Z",
    })
}

/// Store that fails on selected operations and otherwise delegates to memory.
#[derive(Debug, Default)]
pub struct FailingStore {
    inner: MemoryStore,
    fail_reads: bool,
    failing_writes: Vec<&'static str>,
}

impl FailingStore {
    /// Every read fails.
    #[must_use]
    pub fn unreadable() -> Self {
        Self {
            fail_reads: true,
            ..Self::default()
        }
    }

    /// Writes to `keys` fail; everything else works.
    #[must_use]
    pub fn rejecting_writes_to(keys: &[&'static str]) -> Self {
        Self {
            failing_writes: keys.to_vec(),
            ..Self::default()
        }
    }

    /// Read a value directly, bypassing failure injection.
    pub async fn peek(&self, key: &str) -> Option<String> {
        self.inner.get(key).await.ok().flatten()
    }
}

impl KeyValueStore for FailingStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_reads {
            return Err(StorageError::Unavailable(format!("cannot read {key}")));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.failing_writes.iter().any(|k| *k == key) {
            return Err(StorageError::Unavailable(format!("cannot write {key}")));
        }
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key).await
    }
}
