//! Client-side form validation errors.
//!
//! Validation runs before any request is made. A failure blocks the
//! submission and its `Display` text is what the user sees.

use thiserror::Error;

use crate::types::EmailError;

/// Why a form was rejected before submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// One or more fields of a credentials form were left empty.
    #[error("Please fill in all fields")]
    MissingFields,

    /// A specific field is required but blank.
    #[error("{field} is required")]
    Required {
        /// Human-readable field name.
        field: &'static str,
    },

    /// A field exceeds its maximum length.
    #[error("{field} must be at most {max} characters")]
    TooLong {
        /// Human-readable field name.
        field: &'static str,
        /// Maximum allowed length in characters.
        max: usize,
    },

    /// The email address is malformed.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),
}
