use thiserror::Error;

/// Store layer errors
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Version conflict: expected version {expected}, store holds {actual}")]
    VersionConflict { expected: i64, actual: i64 },

    #[error("Email already registered: {0}")]
    EmailTaken(String),

    #[error("Store operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error(transparent)]
    CoreError(#[from] confab_core::error::CoreError),
}

pub type DbResult<T> = std::result::Result<T, DbError>;
