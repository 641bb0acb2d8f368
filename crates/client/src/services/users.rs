//! Profile and admin user list.

use tracing::instrument;

use inkpost_core::{Profile, User, gate};

use super::{ServiceError, require_signed_in};
use crate::session::SessionManager;
use crate::storage::KeyValueStore;

/// Fetch the signed-in user's profile, refreshing the cached admin flag.
///
/// # Errors
///
/// Returns `ServiceError::NotSignedIn` without a session and
/// `ServiceError::Session` if the profile cannot be fetched.
#[instrument(skip_all)]
pub async fn profile<S: KeyValueStore>(sessions: &SessionManager<S>) -> Result<Profile, ServiceError> {
    require_signed_in(sessions).await?;
    Ok(sessions.refresh_profile().await?)
}

/// List every user. Admins only; others are refused without a request.
///
/// # Errors
///
/// Returns `ServiceError::AdminRequired` for non-admins and
/// `ServiceError::Api` if the server rejects the request.
#[instrument(skip_all)]
pub async fn list_users<S: KeyValueStore>(sessions: &SessionManager<S>) -> Result<Vec<User>, ServiceError> {
    let actor = require_signed_in(sessions).await?;
    if !gate::can_manage_users(&actor) {
        return Err(ServiceError::AdminRequired);
    }
    Ok(sessions.api().list_users().await?)
}
