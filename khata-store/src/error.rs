use thiserror::Error;

/// Result alias for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Error type surfaced by the storage layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Storage(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("constraint violated: {0}")]
    Constraint(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        match &value {
            rusqlite::Error::SqliteFailure(err, message)
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Self::Constraint(
                    message
                        .clone()
                        .unwrap_or_else(|| "unique or foreign key constraint".to_string()),
                )
            }
            _ => Self::Storage(value.to_string()),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Storage(value.to_string())
    }
}
