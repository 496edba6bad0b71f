use khata_core::AuthError;
use khata_store::StoreError;
use thiserror::Error;

pub type BillingResult<T> = Result<T, BillingError>;

#[derive(Debug, Error)]
pub enum BillingError {
    #[error(transparent)]
    Unauthorized(#[from] AuthError),
    /// Also covers rows that exist but belong to another organization.
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("settlement export failed: {0}")]
    Export(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}
