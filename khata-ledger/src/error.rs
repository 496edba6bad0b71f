use khata_core::AuthError;
use khata_store::StoreError;
use thiserror::Error;

/// Result alias for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Error type surfaced by wallet mutations and the audit.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("unauthorized: {0}")]
    Unauthorized(#[from] AuthError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}
