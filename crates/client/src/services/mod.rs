//! User-facing flows.
//!
//! Each function corresponds to one action a user can take. Flows validate
//! input, consult the authorization gate and then call the API through the
//! session's client.

pub mod auth;
pub mod posts;
pub mod users;

use thiserror::Error;
use tracing::{debug, warn};

use inkpost_core::{Actor, Denied, ValidationError};

use crate::api::ApiError;
use crate::session::{SessionError, SessionManager};
use crate::storage::KeyValueStore;

/// Errors from user-facing flows.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The input was rejected before submission.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A session operation failed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The gate refused the action.
    #[error(transparent)]
    Forbidden(#[from] Denied),

    /// The action is only available to administrators.
    #[error("administrator access required")]
    AdminRequired,

    /// The action needs a signed-in session.
    #[error("not signed in")]
    NotSignedIn,
}

impl ServiceError {
    /// One-line text for an alert: the server's message when there is one,
    /// otherwise `fallback` or a description of the local failure.
    #[must_use]
    pub fn alert_message(&self, fallback: &str) -> String {
        match self {
            Self::Api(e) | Self::Session(SessionError::Profile(e)) => e.alert_message(fallback),
            Self::Validation(e) => e.to_string(),
            Self::Forbidden(e) => capitalize(&e.to_string()),
            Self::AdminRequired => "This section is reserved for administrators".to_string(),
            Self::NotSignedIn | Self::Session(SessionError::NotSignedIn) => {
                "You need to log in first".to_string()
            }
            Self::Session(_) => fallback.to_string(),
        }
    }

    /// Whether the server refused the stored credentials.
    #[must_use]
    pub const fn is_auth_rejection(&self) -> bool {
        match self {
            Self::Api(e) | Self::Session(SessionError::Profile(e)) => e.is_auth_rejection(),
            _ => false,
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// The signed-in actor, possibly without a user ID.
async fn require_signed_in<S: KeyValueStore>(
    sessions: &SessionManager<S>,
) -> Result<Actor, ServiceError> {
    sessions.actor().await.ok_or(ServiceError::NotSignedIn)
}

/// The signed-in actor with a known user ID.
///
/// Sessions restored from older storage may lack the ID; the profile is
/// fetched once to fill it in.
async fn require_actor<S: KeyValueStore>(
    sessions: &SessionManager<S>,
) -> Result<Actor, ServiceError> {
    let actor = require_signed_in(sessions).await?;
    if actor.id.is_some() {
        return Ok(actor);
    }

    debug!("Cached user ID missing, refreshing profile");
    sessions.refresh_profile().await?;
    require_signed_in(sessions).await
}

/// The signed-in actor, with the user ID filled in when it can be fetched.
///
/// Used where a missing ID only hides controls. A failed profile fetch is
/// logged and the actor is returned without an ID.
async fn actor_for_display<S: KeyValueStore>(
    sessions: &SessionManager<S>,
) -> Result<Actor, ServiceError> {
    let actor = require_signed_in(sessions).await?;
    if actor.id.is_some() {
        return Ok(actor);
    }

    match sessions.refresh_profile().await {
        Ok(_) => require_signed_in(sessions).await,
        Err(e) => {
            warn!(error = %e, "Could not load profile, ownership unknown");
            Ok(actor)
        }
    }
}
