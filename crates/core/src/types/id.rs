//! Newtype IDs for type-safe entity references.
//!
//! The blog API does not commit to a single ID representation: depending on
//! the backing store an ID arrives as a JSON number or as a string. IDs are
//! kept as opaque strings on the client side, which is all that is needed to
//! compare ownership and to build request paths.

use serde::Deserialize;

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize` with `#[serde(transparent)]`
/// - `Deserialize` accepting either a JSON number or a JSON string
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - `Display`, `FromStr` and `From<&str>`/`From<String>`/`From<i64>`
///
/// # Example
///
/// ```rust
/// # use inkpost_core::define_id;
/// define_id!(UserId);
/// define_id!(PostId);
///
/// let user_id = UserId::from(1);
/// let post_id = PostId::from("1");
///
/// assert_eq!(user_id.as_str(), post_id.as_str());
/// // These are different types, so this won't compile:
/// // let _: UserId = post_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, ::serde::Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from its textual form.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the ID as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::convert::Infallible;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                Ok(Self(s.to_owned()))
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id.to_string())
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                <$crate::types::id::RawId as ::serde::Deserialize>::deserialize(deserializer)
                    .map(|raw| Self(raw.into_string()))
            }
        }
    };
}

/// Wire representation of an ID before normalization.
#[doc(hidden)]
#[derive(Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Number(i64),
    Unsigned(u64),
    Text(String),
}

impl RawId {
    #[doc(hidden)]
    #[must_use]
    pub fn into_string(self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Unsigned(n) => n.to_string(),
            Self::Text(s) => s,
        }
    }
}

define_id!(UserId);
define_id!(PostId);
