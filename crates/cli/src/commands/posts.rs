//! Post commands.
//!
//! # Usage
//!
//! ```bash
//! inkpost post create -t "Title" -c "Body"
//! inkpost post show 12
//! inkpost post edit 12 -t "New title"
//! inkpost post delete 12 --yes
//! ```

use std::io::{BufRead, Write};

use inkpost_client::services::posts;
use inkpost_core::{PostDraft, PostId};

use super::{CommandError, Sessions, failed};
use crate::render;

pub async fn create(
    sessions: &Sessions,
    out: &mut impl Write,
    title: String,
    content: String,
) -> Result<(), CommandError> {
    let created = posts::create(sessions, &PostDraft::new(title, content))
        .await
        .map_err(failed("Unable to create the post"))?;
    render::created(out, created.as_ref())?;
    Ok(())
}

pub async fn show(sessions: &Sessions, out: &mut impl Write, id: &PostId) -> Result<(), CommandError> {
    let view = posts::view(sessions, id)
        .await
        .map_err(failed("Unable to load the post"))?;
    render::post(out, &view)?;
    Ok(())
}

/// Edit a post. Fields left out keep their current value.
pub async fn edit(
    sessions: &Sessions,
    out: &mut impl Write,
    id: &PostId,
    title: Option<String>,
    content: Option<String>,
) -> Result<(), CommandError> {
    match (title, content) {
        (Some(title), Some(content)) => {
            posts::update(sessions, id, &PostDraft::new(title, content))
                .await
                .map_err(failed("Unable to update the post"))?;
        }
        (title, content) => {
            let current = posts::view(sessions, id)
                .await
                .map_err(failed("Unable to load the post"))?
                .post;
            let draft = PostDraft::new(
                title.unwrap_or_else(|| current.title.clone()),
                content.unwrap_or_else(|| current.content.clone()),
            );
            posts::update_loaded(sessions, &current, &draft)
                .await
                .map_err(failed("Unable to update the post"))?;
        }
    }

    render::notice(out, "Post updated.")?;
    Ok(())
}

/// Delete a post after confirmation, unless `assume_yes` is set.
pub async fn delete(
    sessions: &Sessions,
    out: &mut impl Write,
    input: &mut impl BufRead,
    id: &PostId,
    assume_yes: bool,
) -> Result<(), CommandError> {
    if !assume_yes && !confirm(out, input, &format!("Delete post #{id}? [y/N] "))? {
        render::notice(out, "Cancelled.")?;
        return Ok(());
    }

    posts::delete(sessions, id)
        .await
        .map_err(failed("Unable to delete the post"))?;
    render::notice(out, "Post deleted.")?;
    Ok(())
}

fn confirm(out: &mut impl Write, input: &mut impl BufRead, prompt: &str) -> std::io::Result<bool> {
    write!(out, "{prompt}")?;
    out.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
