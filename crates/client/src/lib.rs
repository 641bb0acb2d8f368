//! Inkpost client library.
//!
//! Everything between the command-line front end and the remote blog API:
//!
//! - [`config`] - Configuration loaded from environment variables
//! - [`storage`] - Key-value persistence for session data
//! - [`api`] - Typed REST client with bearer-token injection
//! - [`session`] - Session bootstrap, sign-in and sign-out
//! - [`services`] - One flow per user action (register, login, posts, users)
//!
//! # Flow
//!
//! 1. [`session::SessionManager::bootstrap`] reads the persisted token and admin flag
//! 2. Without a token only `register` and `login` are available
//! 3. Login stores the token, fetches the profile and caches the admin flag
//! 4. Post and user flows consult the authorization gate before calling the API

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod services;
pub mod session;
pub mod storage;

pub use api::{ApiClient, ApiError};
pub use config::{ClientConfig, ConfigError};
pub use services::ServiceError;
pub use session::{SessionError, SessionManager};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
