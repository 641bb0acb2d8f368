//! Session manager.
//!
//! [`SessionManager`] is a cloneable handle that owns the in-memory
//! [`Session`] and keeps it in step with the key-value store. All session
//! mutations go through it; every transition is checked against
//! [`SessionState::next`].

use std::fmt;
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use inkpost_core::{
    Actor, InvalidTransition, Profile, Session, SessionEvent, SessionState, UserId,
};

use crate::api::{ApiClient, ApiError};
use crate::storage::{KeyValueStore, StorageError, keys};

/// Errors from session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The operation is not valid in the current state.
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),

    /// The operation needs a signed-in session.
    #[error("not signed in")]
    NotSignedIn,

    /// The token could not be persisted.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The profile could not be fetched.
    #[error("failed to load profile: {0}")]
    Profile(#[source] ApiError),
}

struct Inner<S> {
    api: ApiClient<S>,
    session: RwLock<Session>,
}

/// Shared handle to the session and the API client it authenticates.
pub struct SessionManager<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for SessionManager<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> fmt::Debug for SessionManager<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("api", &self.inner.api)
            .finish_non_exhaustive()
    }
}

impl<S: KeyValueStore> SessionManager<S> {
    /// Create a manager in the `Loading` state.
    #[must_use]
    pub fn new(api: ApiClient<S>) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                session: RwLock::new(Session::loading()),
            }),
        }
    }

    /// The API client, sharing this session's store.
    #[must_use]
    pub fn api(&self) -> &ApiClient<S> {
        &self.inner.api
    }

    /// Snapshot of the current session.
    pub async fn current(&self) -> Session {
        self.inner.session.read().await.clone()
    }

    /// Coarse state of the current session.
    pub async fn state(&self) -> SessionState {
        self.inner.session.read().await.state()
    }

    /// The signed-in actor, if any.
    pub async fn actor(&self) -> Option<Actor> {
        self.inner.session.read().await.actor()
    }

    fn store(&self) -> &S {
        self.inner.api.store()
    }

    /// Restore the session from storage.
    ///
    /// Runs once; later calls return the current session. On error the
    /// session stays `Loading`.
    ///
    /// # Errors
    ///
    /// Returns the first storage read failure.
    #[instrument(skip(self))]
    pub async fn try_bootstrap(&self) -> Result<Session, StorageError> {
        let mut session = self.inner.session.write().await;
        if !session.is_loading() {
            return Ok(session.clone());
        }

        let store = self.store();
        let Some(token) = store
            .get(keys::USER_TOKEN)
            .await?
            .filter(|t| !t.is_empty())
        else {
            debug!("No stored token");
            *session = Session::signed_out();
            return Ok(session.clone());
        };

        let is_admin = store.get(keys::USER_IS_ADMIN).await?.as_deref() == Some("true");
        let user_id = store
            .get(keys::USER_ID)
            .await?
            .filter(|id| !id.is_empty())
            .map(UserId::from);

        debug!(is_admin, has_user_id = user_id.is_some(), "Session restored");
        *session = Session::authenticated(SecretString::from(token), is_admin, user_id);
        Ok(session.clone())
    }

    /// Restore the session from storage, treating read failures as no session.
    pub async fn bootstrap(&self) -> Session {
        match self.try_bootstrap().await {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "Could not read stored session, starting signed out");
                let mut session = self.inner.session.write().await;
                if session.is_loading() {
                    *session = Session::signed_out();
                }
                session.clone()
            }
        }
    }

    /// Sign in with a token returned by the login endpoint.
    ///
    /// The token is persisted first so the profile request carries it. If the
    /// profile cannot be fetched the token is removed again.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless signed out,
    /// `SessionError::Storage` if the token cannot be persisted and
    /// `SessionError::Profile` if the profile fetch fails.
    #[instrument(skip(self, token))]
    pub async fn sign_in(&self, token: SecretString) -> Result<Session, SessionError> {
        let mut session = self.inner.session.write().await;
        session
            .state()
            .next(SessionEvent::SignedIn { is_admin: false })?;

        let store = self.store();
        store
            .set(keys::USER_TOKEN, token.expose_secret())
            .await?;

        let profile = match self.inner.api.profile().await {
            Ok(profile) => profile,
            Err(e) => {
                if let Err(rollback) = store.remove(keys::USER_TOKEN).await {
                    warn!(error = %rollback, "Could not remove token after failed sign-in");
                }
                return Err(SessionError::Profile(e));
            }
        };

        self.persist_profile(&profile).await;
        *session = Session::authenticated(token, profile.is_admin, Some(profile.id));

        debug!(is_admin = session.is_admin(), "Signed in");
        Ok(session.clone())
    }

    /// Clear the session and every persisted key.
    ///
    /// Valid from every state. Removal failures are logged.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> Session {
        let mut session = self.inner.session.write().await;

        let store = self.store();
        for key in keys::ALL {
            if let Err(e) = store.remove(key).await {
                warn!(key, error = %e, "Could not remove stored session value");
            }
        }

        *session = Session::signed_out();
        debug!("Signed out");
        session.clone()
    }

    /// Fetch the profile again and update the cached admin flag and user ID.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotSignedIn` without a token and
    /// `SessionError::Profile` if the fetch fails.
    #[instrument(skip(self))]
    pub async fn refresh_profile(&self) -> Result<Profile, SessionError> {
        let mut session = self.inner.session.write().await;
        let Some(token) = session.token().cloned() else {
            return Err(SessionError::NotSignedIn);
        };

        let profile = self
            .inner
            .api
            .profile()
            .await
            .map_err(SessionError::Profile)?;
        session.state().next(SessionEvent::ProfileRefreshed {
            is_admin: profile.is_admin,
        })?;

        self.persist_profile(&profile).await;
        *session = Session::authenticated(token, profile.is_admin, Some(profile.id.clone()));
        Ok(profile)
    }

    async fn persist_profile(&self, profile: &Profile) {
        let store = self.store();
        let flag = if profile.is_admin { "true" } else { "false" };
        if let Err(e) = store.set(keys::USER_IS_ADMIN, flag).await {
            warn!(error = %e, "Could not persist admin flag");
        }
        if let Err(e) = store.set(keys::USER_ID, profile.id.as_str()).await {
            warn!(error = %e, "Could not persist user ID");
        }
    }
}
