use khata_core::AuthError;
use khata_store::StoreError;
use thiserror::Error;

/// Result alias for roster operations.
pub type RosterResult<T> = Result<T, RosterError>;

/// Error type surfaced by registration and member management.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("unauthorized: {0}")]
    Unauthorized(#[from] AuthError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RosterError {
    /// Rewrites unique-key violations into a domain conflict; other storage
    /// errors pass through untouched.
    pub(crate) fn on_conflict(self, message: &str) -> Self {
        match self {
            RosterError::Store(StoreError::Constraint(_)) => {
                RosterError::Conflict(message.to_string())
            }
            other => other,
        }
    }
}
