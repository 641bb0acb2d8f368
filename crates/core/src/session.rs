//! Session value and its state machine.
//!
//! A [`Session`] is the in-memory view of the persisted authentication data.
//! Its coarse [`SessionState`] decides which screens are reachable:
//!
//! ```text
//! Loading ──NothingStored──▶ Unauthenticated ──SignedIn──▶ Authenticated
//!    └──────────Restored──────────────────────────────────────▲   │
//!                            ▲                                     │
//!                            └──────────────SignedOut──────────────┘
//! ```
//!
//! There is no expiry edge. A token rejected by the server is only noticed
//! when a request fails, and the session stays as it is.

use core::fmt;

use secrecy::SecretString;
use thiserror::Error;

use crate::gate::Actor;
use crate::types::UserId;

/// Authentication state of the client.
///
/// `is_admin` and `user_id` only carry meaning while a token is present and
/// are cleared together with it. The admin flag only toggles client-side
/// affordances; the server never trusts it.
#[derive(Debug, Clone)]
pub struct Session {
    token: Option<SecretString>,
    is_admin: bool,
    user_id: Option<UserId>,
    is_loading: bool,
}

impl Session {
    /// The session at process start, before storage has been read.
    #[must_use]
    pub const fn loading() -> Self {
        Self {
            token: None,
            is_admin: false,
            user_id: None,
            is_loading: true,
        }
    }

    /// A session with no credentials.
    #[must_use]
    pub const fn signed_out() -> Self {
        Self {
            token: None,
            is_admin: false,
            user_id: None,
            is_loading: false,
        }
    }

    /// A session holding a token.
    #[must_use]
    pub const fn authenticated(token: SecretString, is_admin: bool, user_id: Option<UserId>) -> Self {
        Self {
            token: Some(token),
            is_admin,
            user_id,
            is_loading: false,
        }
    }

    /// The bearer token, if signed in.
    #[must_use]
    pub const fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    /// Cached admin flag. Always `false` without a token.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.token.is_some() && self.is_admin
    }

    /// The signed-in user's ID, when known.
    #[must_use]
    pub const fn user_id(&self) -> Option<&UserId> {
        match &self.token {
            Some(_) => self.user_id.as_ref(),
            None => None,
        }
    }

    /// Whether storage has not been read yet.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Whether a token is present.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        !self.is_loading && self.token.is_some()
    }

    /// Coarse state used for screen selection.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        if self.is_loading {
            SessionState::Loading
        } else if self.token.is_some() {
            SessionState::Authenticated {
                is_admin: self.is_admin,
            }
        } else {
            SessionState::Unauthenticated
        }
    }

    /// The actor seen by the authorization gate, if signed in.
    #[must_use]
    pub fn actor(&self) -> Option<Actor> {
        self.is_authenticated().then(|| Actor {
            id: self.user_id.clone(),
            is_admin: self.is_admin,
        })
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::loading()
    }
}

/// Coarse session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Storage has not been read yet.
    Loading,
    /// No token; authentication screens are shown.
    Unauthenticated,
    /// Token present; main screens are shown.
    Authenticated {
        /// Cached admin flag.
        is_admin: bool,
    },
}

/// Something that happened to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionEvent {
    /// Bootstrap found a stored token.
    Restored {
        /// Admin flag read from storage.
        is_admin: bool,
    },
    /// Bootstrap found no token, or storage could not be read.
    NothingStored,
    /// Sign-in completed and the profile was fetched.
    SignedIn {
        /// Admin flag derived from the profile.
        is_admin: bool,
    },
    /// The profile was fetched again while signed in.
    ProfileRefreshed {
        /// Admin flag derived from the profile.
        is_admin: bool,
    },
    /// Credentials were cleared.
    SignedOut,
}

/// An event that is not valid in the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot apply {event:?} while {from}")]
pub struct InvalidTransition {
    /// State the session was in.
    pub from: SessionState,
    /// Rejected event.
    pub event: SessionEvent,
}

impl SessionState {
    /// Compute the state that follows `event`.
    ///
    /// Sign-out is accepted from every state so that stale storage can always
    /// be cleared.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` for any edge not in the state machine,
    /// e.g. signing in twice or bootstrapping after bootstrap.
    pub const fn next(self, event: SessionEvent) -> Result<Self, InvalidTransition> {
        match (self, event) {
            (Self::Loading, SessionEvent::Restored { is_admin })
            | (Self::Unauthenticated, SessionEvent::SignedIn { is_admin })
            | (Self::Authenticated { .. }, SessionEvent::ProfileRefreshed { is_admin }) => {
                Ok(Self::Authenticated { is_admin })
            }
            (Self::Loading, SessionEvent::NothingStored) | (_, SessionEvent::SignedOut) => {
                Ok(Self::Unauthenticated)
            }
            (from, event) => Err(InvalidTransition { from, event }),
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => write!(f, "loading"),
            Self::Unauthenticated => write!(f, "signed out"),
            Self::Authenticated { is_admin: true } => write!(f, "signed in (admin)"),
            Self::Authenticated { is_admin: false } => write!(f, "signed in"),
        }
    }
}
