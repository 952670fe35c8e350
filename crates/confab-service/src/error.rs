use serde::Serialize;
use thiserror::Error;

/// Which parties an availability check found unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UnavailableParties {
    pub host: bool,
    pub guest: bool,
}

impl UnavailableParties {
    #[must_use]
    pub fn any(self) -> bool {
        self.host || self.guest
    }
}

impl std::fmt::Display for UnavailableParties {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.host, self.guest) {
            (true, true) => f.write_str("host and guest"),
            (true, false) => f.write_str("host"),
            (false, true) => f.write_str("guest"),
            (false, false) => f.write_str("nobody"),
        }
    }
}

/// Service layer errors - combines all error types
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    StoreError(#[from] confab_db::error::DbError),

    #[error(transparent)]
    CoreError(#[from] confab_core::error::CoreError),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("{0} not available for the selected time slot")]
    SlotUnavailable(UnavailableParties),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
