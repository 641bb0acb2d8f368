//! Advisory authorization gate.
//!
//! Decides which controls to offer and which endpoint variant to call. The
//! server is the enforcing party; these checks only keep the client from
//! presenting actions that would be rejected.

use core::fmt;

use thiserror::Error;

use crate::types::UserId;

/// The signed-in user, as far as authorization is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// The actor's user ID. `None` if it has not been fetched yet, in which
    /// case ownership cannot be established.
    pub id: Option<UserId>,
    /// Cached admin flag.
    pub is_admin: bool,
}

impl Actor {
    /// Whether this actor owns a resource created by `owner`.
    #[must_use]
    pub fn owns(&self, owner: &UserId) -> bool {
        self.id.as_ref() == Some(owner)
    }
}

/// Something an actor wants to do with a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Read the resource.
    View,
    /// Change the resource.
    Edit,
    /// Remove the resource.
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::View => write!(f, "view"),
            Self::Edit => write!(f, "edit"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Which endpoint variant an action must use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// The endpoint is the same for every signed-in actor.
    Shared,
    /// The "any resource" variant, reserved for admins.
    AnyResource,
    /// The "own resource" variant, reserved for the owner.
    OwnResource,
}

/// The gate refused an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("you are not allowed to {action} this resource")]
pub struct Denied {
    /// The refused action.
    pub action: Action,
}

/// Any signed-in actor may view posts.
#[must_use]
pub const fn can_view(_actor: &Actor) -> bool {
    true
}

/// Admins may modify anything; others only what they own.
#[must_use]
pub fn can_modify(actor: &Actor, owner: &UserId) -> bool {
    actor.is_admin || actor.owns(owner)
}

/// Admins may delete anything; others only what they own.
#[must_use]
pub fn can_delete(actor: &Actor, owner: &UserId) -> bool {
    actor.is_admin || actor.owns(owner)
}

/// Only admins see the user list.
#[must_use]
pub const fn can_manage_users(actor: &Actor) -> bool {
    actor.is_admin
}

/// Pick the endpoint variant for `action` on a resource owned by `owner`.
///
/// An admin always gets [`Scope::AnyResource`], even for their own posts.
///
/// # Errors
///
/// Returns `Denied` when the actor is neither an admin nor the owner.
pub fn resolve(actor: &Actor, action: Action, owner: &UserId) -> Result<Scope, Denied> {
    let allowed = match action {
        Action::View => return Ok(Scope::Shared),
        Action::Edit => can_modify(actor, owner),
        Action::Delete => can_delete(actor, owner),
    };

    match (allowed, actor.is_admin) {
        (false, _) => Err(Denied { action }),
        (true, true) => Ok(Scope::AnyResource),
        (true, false) => Ok(Scope::OwnResource),
    }
}
