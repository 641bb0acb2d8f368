//! Account creation, login and logout.

use tracing::{debug, instrument};

use inkpost_core::{LoginForm, RegisterForm, Session};

use super::ServiceError;
use crate::api::ApiClient;
use crate::session::SessionManager;
use crate::storage::KeyValueStore;

/// Create an account. On success the user proceeds to login.
///
/// # Errors
///
/// Returns `ServiceError::Validation` for blank fields or a malformed email,
/// and `ServiceError::Api` if the server rejects the registration.
#[instrument(skip_all)]
pub async fn register<S: KeyValueStore>(
    api: &ApiClient<S>,
    form: &RegisterForm,
) -> Result<(), ServiceError> {
    let email = form.validate()?;
    api.register(form.name.trim(), &email, &form.password).await?;
    debug!(email = %email, "Registration accepted");
    Ok(())
}

/// Log in and establish the session.
///
/// # Errors
///
/// Returns `ServiceError::Validation` for blank fields, `ServiceError::Api`
/// if the credentials are rejected and `ServiceError::Session` if the
/// session cannot be established.
#[instrument(skip_all)]
pub async fn login<S: KeyValueStore>(
    sessions: &SessionManager<S>,
    form: &LoginForm,
) -> Result<Session, ServiceError> {
    let email = form.validate()?;
    let token = sessions.api().login(&email, &form.password).await?;
    Ok(sessions.sign_in(token).await?)
}

/// Log out. Always succeeds.
pub async fn logout<S: KeyValueStore>(sessions: &SessionManager<S>) -> Session {
    sessions.sign_out().await
}
