//! Wire payloads and input forms.
//!
//! The blog API wraps data-bearing responses in a `{ "data": ... }` envelope
//! and uses camelCase field names. Payloads are parsed into these types at the
//! client boundary so nothing downstream reaches into untyped JSON.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{Email, PostId, UserId};
use crate::validation::ValidationError;

/// Maximum post title length accepted by the editor.
pub const TITLE_MAX_CHARS: usize = 100;

/// `{ "data": T }` response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    /// The wrapped payload.
    pub data: T,
}

/// Body of a successful `/user/login` response.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// Opaque bearer token.
    pub token: String,
}

/// Body of an error response. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    /// Server-provided, user-facing message.
    #[serde(default)]
    pub message: Option<String>,
}

/// The signed-in user's profile as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// User ID.
    pub id: UserId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Email address as stored on the server.
    #[serde(default)]
    pub email: String,
    /// Admin capability flag. Absent or `null` means not an admin.
    #[serde(default, deserialize_with = "null_as_false")]
    pub is_admin: bool,
}

/// An entry of the admin user list. Same shape as [`Profile`].
pub type User = Profile;

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// A blog post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Post ID.
    pub id: PostId,
    /// Title.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Author of the post.
    pub user_id: UserId,
    /// When the post was created.
    pub created_at: DateTime<Utc>,
    /// When the post was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// The user who owns this post.
    #[must_use]
    pub const fn owner(&self) -> &UserId {
        &self.user_id
    }

    /// Whether the post has been updated since it was created.
    #[must_use]
    pub fn was_edited(&self) -> bool {
        self.updated_at != self.created_at
    }
}

/// Title and content of a post being created or edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostDraft {
    /// Title.
    pub title: String,
    /// Body text.
    pub content: String,
}

impl PostDraft {
    /// Create a draft.
    #[must_use]
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Check the draft before it is submitted.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::Required` if the title or content is blank
    /// and `ValidationError::TooLong` if the title exceeds
    /// [`TITLE_MAX_CHARS`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::Required { field: "Title" });
        }
        if self.content.trim().is_empty() {
            return Err(ValidationError::Required { field: "Content" });
        }
        if self.title.chars().count() > TITLE_MAX_CHARS {
            return Err(ValidationError::TooLong {
                field: "Title",
                max: TITLE_MAX_CHARS,
            });
        }
        Ok(())
    }
}

/// Account registration input.
#[derive(Debug, Clone)]
pub struct RegisterForm {
    /// Display name.
    pub name: String,
    /// Email address, unvalidated.
    pub email: String,
    /// Password.
    pub password: SecretString,
}

impl RegisterForm {
    /// Check that every field is filled and the email is well-formed.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MissingFields` if any field is blank and
    /// `ValidationError::InvalidEmail` if the email cannot be parsed.
    pub fn validate(&self) -> Result<Email, ValidationError> {
        if self.name.trim().is_empty()
            || self.email.trim().is_empty()
            || self.password.expose_secret().is_empty()
        {
            return Err(ValidationError::MissingFields);
        }
        Ok(Email::parse(&self.email)?)
    }
}

/// Login input.
#[derive(Debug, Clone)]
pub struct LoginForm {
    /// Email address, unvalidated.
    pub email: String,
    /// Password.
    pub password: SecretString,
}

impl LoginForm {
    /// Check that both fields are filled and the email is well-formed.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MissingFields` if either field is blank and
    /// `ValidationError::InvalidEmail` if the email cannot be parsed.
    pub fn validate(&self) -> Result<Email, ValidationError> {
        if self.email.trim().is_empty() || self.password.expose_secret().is_empty() {
            return Err(ValidationError::MissingFields);
        }
        Ok(Email::parse(&self.email)?)
    }
}
