//! Error hierarchy.
//!
//! Subsystem enums ([`CollabError`], [`DetectionError`]) convert into the
//! crate-wide [`TandemError`] with `?`.

mod collab_error;
mod detection_error;

pub use collab_error::CollabError;
pub use detection_error::DetectionError;

/// Crate-wide result alias.
pub type TandemResult<T> = Result<T, TandemError>;

/// Top-level error for every Tandem operation.
#[derive(Debug, thiserror::Error)]
pub enum TandemError {
    #[error(transparent)]
    Collab(#[from] CollabError),

    #[error(transparent)]
    Detection(#[from] DetectionError),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// A lock was poisoned by a panicking writer.
    #[error("concurrency error: {0}")]
    ConcurrencyError(String),
}

impl TandemError {
    /// The collaboration error inside, if this is one.
    pub fn as_collab(&self) -> Option<&CollabError> {
        match self {
            TandemError::Collab(e) => Some(e),
            _ => None,
        }
    }
}
