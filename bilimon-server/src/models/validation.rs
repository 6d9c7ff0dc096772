//! Validation error types

use std::fmt;

/// Validation error for request input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Field is empty when it shouldn't be
    Empty { field: &'static str },

    /// String doesn't match required format (e.g., bvid)
    InvalidFormat { field: &'static str, reason: &'static str },

    /// Request carried none of the fields an update needs
    NothingToUpdate,

    /// Body or query string could not be decoded
    Malformed { part: &'static str, detail: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{} cannot be empty", field),
            Self::InvalidFormat { field, reason } => {
                write!(f, "{}: {}", field, reason)
            }
            Self::NothingToUpdate => write!(f, "no updatable fields supplied"),
            Self::Malformed { part, detail } => write!(f, "malformed {}: {}", part, detail),
        }
    }
}

impl std::error::Error for ValidationError {}
