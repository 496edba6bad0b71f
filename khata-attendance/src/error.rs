use khata_core::AuthError;
use khata_store::StoreError;
use thiserror::Error;

pub type AttendanceResult<T> = Result<T, AttendanceError>;

#[derive(Debug, Error)]
pub enum AttendanceError {
    #[error(transparent)]
    Unauthorized(#[from] AuthError),
    /// Also covers rows that exist but belong to another organization.
    #[error("not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}
