//! Profile and user list commands.

use std::io::Write;

use inkpost_client::services::users;

use super::{CommandError, Sessions, failed};
use crate::render;

pub async fn profile(sessions: &Sessions, out: &mut impl Write) -> Result<(), CommandError> {
    let profile = users::profile(sessions)
        .await
        .map_err(failed("Unable to load your profile"))?;
    render::profile(out, &profile)?;
    Ok(())
}

pub async fn list(sessions: &Sessions, out: &mut impl Write) -> Result<(), CommandError> {
    let users = users::list_users(sessions)
        .await
        .map_err(failed("Unable to load users"))?;
    render::users(out, &users)?;
    Ok(())
}
