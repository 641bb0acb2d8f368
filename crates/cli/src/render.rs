//! Plain-text output.
//!
//! Everything the CLI shows is written through these functions so commands
//! stay free of formatting and can be checked against an in-memory buffer.

use std::io::{self, Write};

use inkpost_client::services::posts::PostView;
use inkpost_core::{Post, Profile, Session, SessionState, User};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

/// One-line alert, plus a hint when the server refused the stored token.
pub fn alert(out: &mut impl Write, message: &str, suggest_login: bool) -> io::Result<()> {
    writeln!(out, "Error: {message}")?;
    if suggest_login {
        writeln!(out, "Hint: run `inkpost login` to sign in again.")?;
    }
    Ok(())
}

/// A short confirmation message.
pub fn notice(out: &mut impl Write, message: &str) -> io::Result<()> {
    writeln!(out, "{message}")
}

pub fn session(out: &mut impl Write, session: &Session) -> io::Result<()> {
    let state = session.state();
    let mut label = state.to_string();
    if let Some(first) = label.get_mut(..1) {
        first.make_ascii_uppercase();
    }
    writeln!(out, "Status: {label}")?;

    if let (SessionState::Authenticated { .. }, Some(id)) = (state, session.user_id()) {
        writeln!(out, "User ID: {id}")?;
    }
    Ok(())
}

pub fn profile(out: &mut impl Write, profile: &Profile) -> io::Result<()> {
    writeln!(out, "Name:  {}", profile.name)?;
    writeln!(out, "Email: {}", profile.email)?;
    writeln!(out, "Role:  {}", if profile.is_admin { "administrator" } else { "member" })
}

pub fn users(out: &mut impl Write, users: &[User]) -> io::Result<()> {
    let noun = if users.len() == 1 { "user" } else { "users" };
    writeln!(out, "{} {noun}", users.len())?;

    for user in users {
        write!(out, "  #{}  {} <{}>", user.id, user.name, user.email)?;
        if user.is_admin {
            write!(out, "  [admin]")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn created(out: &mut impl Write, post: Option<&Post>) -> io::Result<()> {
    match post {
        Some(post) => writeln!(out, "Post #{} published: {}", post.id, post.title),
        None => writeln!(out, "Post published"),
    }
}

pub fn post(out: &mut impl Write, view: &PostView) -> io::Result<()> {
    let post = &view.post;
    writeln!(out, "#{}  {}", post.id, post.title)?;
    write!(
        out,
        "by user #{} on {}",
        post.user_id,
        post.created_at.format(TIMESTAMP_FORMAT)
    )?;
    if post.was_edited() {
        write!(out, " (edited {})", post.updated_at.format(TIMESTAMP_FORMAT))?;
    }
    writeln!(out)?;
    writeln!(out)?;
    writeln!(out, "{}", post.content)?;

    let actions: Vec<&str> = [(view.can_edit, "edit"), (view.can_delete, "delete")]
        .into_iter()
        .filter_map(|(allowed, name)| allowed.then_some(name))
        .collect();
    if !actions.is_empty() {
        writeln!(out)?;
        writeln!(out, "You can {} this post.", actions.join(" or "))?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use inkpost_core::UserId;
    use secrecy::SecretString;

    use super::*;

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn sample_post(updated_at: &str) -> Post {
        serde_json::from_value(serde_json::json!({
            "id": 12,
            "title": "Hello",
            "content": "First post",
            "userId": 3,
            "createdAt": "2024-05-01T10:00:00Z",
            "updatedAt": updated_at,
        }))
        .unwrap()
    }

    #[test]
    fn test_alert_with_login_hint() {
        let text = render(|out| alert(out, "Unauthorized", true));
        assert_eq!(
            text,
            "Error: Unauthorized\nHint: run `inkpost login` to sign in again.\n"
        );
    }

    #[test]
    fn test_session_status() {
        let session =
            Session::authenticated(SecretString::from("t"), true, Some(UserId::from(3)));
        assert_eq!(
            render(|out| self::session(out, &session)),
            "Status: Signed in (admin)\nUser ID: 3\n"
        );
        assert_eq!(
            render(|out| self::session(out, &Session::signed_out())),
            "Status: Signed out\n"
        );
    }

    #[test]
    fn test_user_list_marks_admins() {
        let users: Vec<User> = serde_json::from_value(serde_json::json!([
            {"id": 1, "name": "Ada", "email": "ada@x.com", "isAdmin": true},
            {"id": 2, "name": "Bob", "email": "bob@x.com", "isAdmin": null},
        ]))
        .unwrap();

        let text = render(|out| self::users(out, &users));
        assert_eq!(
            text,
            "2 users\n  #1  Ada <ada@x.com>  [admin]\n  #2  Bob <bob@x.com>\n"
        );
    }

    #[test]
    fn test_post_shows_allowed_actions() {
        let view = PostView {
            post: sample_post("2024-05-02T08:30:00Z"),
            can_edit: true,
            can_delete: true,
        };
        let text = render(|out| self::post(out, &view));
        assert!(text.starts_with("#12  Hello\nby user #3 on 2024-05-01 10:00 UTC (edited 2024-05-02 08:30 UTC)\n"));
        assert!(text.ends_with("You can edit or delete this post.\n"));
    }

    #[test]
    fn test_post_without_actions() {
        let view = PostView {
            post: sample_post("2024-05-01T10:00:00Z"),
            can_edit: false,
            can_delete: false,
        };
        let text = render(|out| self::post(out, &view));
        assert!(!text.contains("edited"));
        assert!(!text.contains("You can"));
    }
}
