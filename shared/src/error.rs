//! Error taxonomy shared by the store, repositories and remote clients.

use thiserror::Error;

/// Failures surfaced to callers. None of them are retried automatically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StudioError {
    /// Network or backend failure while talking to the store.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// The store rejected a write (constraint violation, missing field).
    #[error("rejected by store: {0}")]
    ValidationRejected(String),

    /// No usable session for an operation that needs one.
    #[error("authentication required")]
    AuthRequired,

    /// Sign-in was refused by the auth service.
    #[error("sign-in failed: {0}")]
    Auth(String),

    /// A row addressed by id does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of row, e.g. `"project"`.
        entity: &'static str,
        /// The id that matched nothing.
        id: String,
    },

    /// The media host failed to accept an image.
    #[error("upload failed: {0}")]
    Upload(String),

    /// Missing or malformed environment settings.
    #[error("configuration error: {0}")]
    Config(String),
}

impl StudioError {
    /// Shorthand for [`StudioError::NotFound`].
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}

/// Result alias used across the crate.
pub type Result<T, E = StudioError> = std::result::Result<T, E>;
