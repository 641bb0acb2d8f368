//! Account and session commands.
//!
//! # Usage
//!
//! ```bash
//! inkpost register -n "Ada" -e ada@example.com -p secret
//! inkpost login -e ada@example.com -p secret
//! inkpost status
//! inkpost logout
//! ```

use std::io::Write;

use inkpost_client::services::auth;
use inkpost_core::{LoginForm, RegisterForm};
use secrecy::SecretString;

use super::{CommandError, Sessions, failed};
use crate::render;

pub async fn register(
    sessions: &Sessions,
    out: &mut impl Write,
    name: String,
    email: String,
    password: String,
) -> Result<(), CommandError> {
    let form = RegisterForm {
        name,
        email,
        password: SecretString::from(password),
    };
    auth::register(sessions.api(), &form)
        .await
        .map_err(failed("Unable to create an account"))?;

    render::notice(out, "Account created. Run `inkpost login` to sign in.")?;
    Ok(())
}

/// Log in, replacing any existing session.
pub async fn login(
    sessions: &Sessions,
    out: &mut impl Write,
    email: String,
    password: String,
) -> Result<(), CommandError> {
    if sessions.current().await.is_authenticated() {
        tracing::debug!("Replacing existing session");
        auth::logout(sessions).await;
    }

    let form = LoginForm {
        email,
        password: SecretString::from(password),
    };
    let session = auth::login(sessions, &form)
        .await
        .map_err(failed("Unable to log in"))?;

    render::notice(out, "Logged in.")?;
    render::session(out, &session)?;
    Ok(())
}

pub async fn logout(sessions: &Sessions, out: &mut impl Write) -> Result<(), CommandError> {
    auth::logout(sessions).await;
    render::notice(out, "Logged out.")?;
    Ok(())
}

/// Show the session restored from storage. Makes no request.
pub async fn status(sessions: &Sessions, out: &mut impl Write) -> Result<(), CommandError> {
    render::session(out, &sessions.current().await)?;
    Ok(())
}
