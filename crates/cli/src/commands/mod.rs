//! CLI command implementations.

pub mod auth;
pub mod posts;
pub mod users;

use std::sync::Arc;

use inkpost_client::{
    ApiClient, ApiError, ClientConfig, ConfigError, FileStore, ServiceError, SessionManager,
};
use thiserror::Error;

/// Session handle used by every command.
pub type Sessions = SessionManager<FileStore>;

/// Errors that end a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The HTTP client could not be created.
    #[error("failed to create HTTP client: {0}")]
    Client(#[from] ApiError),

    /// A user action failed.
    #[error("{action}: {source}")]
    Failed {
        /// Generic description of the failed action.
        action: &'static str,
        #[source]
        source: ServiceError,
    },

    /// Output could not be written or input could not be read.
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl CommandError {
    /// Text shown to the user.
    #[must_use]
    pub fn alert_message(&self) -> String {
        match self {
            Self::Failed { action, source } => source.alert_message(action),
            other => other.to_string(),
        }
    }

    /// Whether the server refused the stored credentials.
    #[must_use]
    pub const fn suggests_login(&self) -> bool {
        match self {
            Self::Failed { source, .. } => source.is_auth_rejection(),
            _ => false,
        }
    }
}

/// Tag a service failure with the generic message for `action`.
pub fn failed(action: &'static str) -> impl FnOnce(ServiceError) -> CommandError {
    move |source| CommandError::Failed { action, source }
}

/// Open the persisted session and restore it.
///
/// # Errors
///
/// Returns `CommandError::Client` if the HTTP client cannot be built.
pub async fn connect(config: &ClientConfig) -> Result<Sessions, CommandError> {
    let store = Arc::new(FileStore::new(&config.session_file));
    let sessions = SessionManager::new(ApiClient::new(config, store)?);
    sessions.bootstrap().await;
    Ok(sessions)
}
