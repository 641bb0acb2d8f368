//! Post creation, display, editing and deletion.
//!
//! Edit and delete go to different endpoints depending on who asks: admins
//! use the "any post" routes, owners the "own post" routes. The gate picks
//! the route from the post's owner, so both flows fetch the post first.

use tracing::{debug, instrument};

use inkpost_core::gate::{self, Action, Scope};
use inkpost_core::{Actor, Post, PostDraft, PostId};

use super::{ServiceError, actor_for_display, require_actor, require_signed_in};
use crate::session::SessionManager;
use crate::storage::KeyValueStore;

/// A post together with the controls the actor may use on it.
#[derive(Debug, Clone)]
pub struct PostView {
    /// The post.
    pub post: Post,
    /// Whether the edit control is offered.
    pub can_edit: bool,
    /// Whether the delete control is offered.
    pub can_delete: bool,
}

/// Publish a new post.
///
/// Returns the created post when the server echoes it back.
///
/// # Errors
///
/// Returns `ServiceError::Validation` for a blank or oversized draft,
/// `ServiceError::NotSignedIn` without a session and `ServiceError::Api` if
/// the server rejects the post.
#[instrument(skip_all)]
pub async fn create<S: KeyValueStore>(
    sessions: &SessionManager<S>,
    draft: &PostDraft,
) -> Result<Option<Post>, ServiceError> {
    draft.validate()?;
    require_signed_in(sessions).await?;
    let created = sessions.api().create_post(draft).await?;
    debug!(post_id = ?created.as_ref().map(|p| p.id.as_str()), "Post created");
    Ok(created)
}

/// Load a post for display.
///
/// A session without a cached user ID fetches the profile to decide on the
/// controls. If that fetch fails the post is still shown, without controls.
///
/// # Errors
///
/// Returns `ServiceError::NotSignedIn` without a session and
/// `ServiceError::Api` if the post cannot be loaded.
#[instrument(skip(sessions), fields(post_id = %id))]
pub async fn view<S: KeyValueStore>(
    sessions: &SessionManager<S>,
    id: &PostId,
) -> Result<PostView, ServiceError> {
    let actor = actor_for_display(sessions).await?;
    let post = sessions.api().get_post(id).await?;
    gate::resolve(&actor, Action::View, post.owner())?;

    Ok(PostView {
        can_edit: gate::can_modify(&actor, post.owner()),
        can_delete: gate::can_delete(&actor, post.owner()),
        post,
    })
}

/// Replace a post's title and content.
///
/// Returns the scope that decided which endpoint was called.
///
/// # Errors
///
/// Returns `ServiceError::Validation` for an invalid draft,
/// `ServiceError::Forbidden` if the actor is neither admin nor owner and
/// `ServiceError::Api` if a request fails.
#[instrument(skip(sessions, draft), fields(post_id = %id))]
pub async fn update<S: KeyValueStore>(
    sessions: &SessionManager<S>,
    id: &PostId,
    draft: &PostDraft,
) -> Result<Scope, ServiceError> {
    draft.validate()?;
    let actor = require_actor(sessions).await?;
    let post = sessions.api().get_post(id).await?;
    write_update(sessions, &actor, &post, draft).await
}

/// Replace the title and content of a post the caller already loaded.
///
/// Same as [`update`] without fetching the post again.
///
/// # Errors
///
/// Same as [`update`].
#[instrument(skip_all, fields(post_id = %post.id))]
pub async fn update_loaded<S: KeyValueStore>(
    sessions: &SessionManager<S>,
    post: &Post,
    draft: &PostDraft,
) -> Result<Scope, ServiceError> {
    draft.validate()?;
    let actor = require_actor(sessions).await?;
    write_update(sessions, &actor, post, draft).await
}

async fn write_update<S: KeyValueStore>(
    sessions: &SessionManager<S>,
    actor: &Actor,
    post: &Post,
    draft: &PostDraft,
) -> Result<Scope, ServiceError> {
    let api = sessions.api();
    let scope = gate::resolve(actor, Action::Edit, post.owner())?;
    if scope == Scope::AnyResource {
        api.update_post(&post.id, draft).await?;
    } else {
        api.update_own_post(&post.id, draft).await?;
    }

    debug!(?scope, "Post updated");
    Ok(scope)
}

/// Delete a post.
///
/// Returns the scope that decided which endpoint was called.
///
/// # Errors
///
/// Returns `ServiceError::Forbidden` if the actor is neither admin nor owner
/// and `ServiceError::Api` if a request fails.
#[instrument(skip(sessions), fields(post_id = %id))]
pub async fn delete<S: KeyValueStore>(
    sessions: &SessionManager<S>,
    id: &PostId,
) -> Result<Scope, ServiceError> {
    let actor = require_actor(sessions).await?;
    let api = sessions.api();
    let post = api.get_post(id).await?;

    let scope = gate::resolve(&actor, Action::Delete, post.owner())?;
    if scope == Scope::AnyResource {
        api.delete_post(id).await?;
    } else {
        api.delete_own_post(id).await?;
    }

    debug!(?scope, "Post deleted");
    Ok(scope)
}
