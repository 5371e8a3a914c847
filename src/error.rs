// Error types for the library core
// Reads fail with StoreError, user-initiated writes hand back a MutationError the host can show

use thiserror::Error;

/// Any failure opening the tag store or executing a statement against it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("tag store error: {message}")]
pub struct StoreError {
    pub message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Failure of a playlist membership change (add / remove / create / sweep).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The two-digit ordinal space of a playlist label is used up.
    #[error("playlist '{label}' has no ordinal left after {max}")]
    OrdinalsExhausted { label: String, max: u32 },

    /// Empty, or contains the ordinal delimiter.
    #[error("invalid playlist label '{0}'")]
    InvalidLabel(String),

    #[error("no item selected")]
    NoItemSelected,
}

impl From<rusqlite::Error> for MutationError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Store(err.into())
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
pub type MutationResult<T> = std::result::Result<T, MutationError>;
