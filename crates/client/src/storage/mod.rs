//! Key-value persistence for session data.
//!
//! The session is stored as a handful of string keys, the way a mobile app
//! would use its local async storage. Two backends are provided:
//!
//! - [`MemoryStore`] keeps values in process memory
//! - [`FileStore`] keeps values in a JSON object file on disk
//!
//! Stored values are not encrypted.

mod file;
mod memory;

use std::future::Future;
use std::path::PathBuf;

use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Keys under which session data is persisted.
pub mod keys {
    /// Opaque bearer token.
    pub const USER_TOKEN: &str = "userToken";

    /// Cached admin flag, `"true"` or `"false"`.
    pub const USER_IS_ADMIN: &str = "userIsAdmin";

    /// Signed-in user's ID.
    pub const USER_ID: &str = "userId";

    /// Every session key, in the order they are cleared.
    pub const ALL: [&str; 3] = [USER_TOKEN, USER_IS_ADMIN, USER_ID];
}

/// Errors that can occur when reading or writing persisted values.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing file could not be read or written.
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        /// File that was being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The backing file does not contain a JSON object of strings.
    #[error("session file {} is corrupt: {source}", .path.display())]
    Corrupt {
        /// File that failed to parse.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// The store cannot be used at all.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// An async string-to-string store.
///
/// Implementations must be safe to share between tasks; every operation
/// takes `&self`.
pub trait KeyValueStore: Send + Sync {
    /// Read a value. Missing keys are `Ok(None)`.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StorageError>> + Send;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Delete a value. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), StorageError>> + Send;
}
