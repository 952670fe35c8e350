use salvo::http::StatusCode;
use salvo::writing::Json;
use serde::Serialize;
use thiserror::Error;

use confab_db::error::DbError;
use confab_service::error::ServiceError;

/// Application-level errors (HTTP layer)
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    ServiceError(#[from] ServiceError),

    #[error(transparent)]
    StoreError(#[from] DbError),

    #[error(transparent)]
    CoreError(#[from] confab_core::error::CoreError),
}

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Deterministic status mapping for errors that reach the HTTP surface.
/// Anything not explicitly mapped is a 500 with an opaque body.
fn status_for(err: &AppError) -> StatusCode {
    let service_err = match err {
        AppError::ServiceError(e) => e,
        AppError::StoreError(e) => return status_for_store(e),
        AppError::CoreError(e) => return status_for_core(e),
    };

    match service_err {
        ServiceError::ValidationError(_) => StatusCode::BAD_REQUEST,
        ServiceError::NotAuthenticated => StatusCode::UNAUTHORIZED,
        ServiceError::Unauthorized(_) => StatusCode::FORBIDDEN,
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::Conflict(_) | ServiceError::SlotUnavailable(_) => StatusCode::CONFLICT,
        ServiceError::StoreError(e) => status_for_store(e),
        ServiceError::CoreError(e) => status_for_core(e),
    }
}

fn status_for_store(err: &DbError) -> StatusCode {
    match err {
        DbError::RecordNotFound(_) => StatusCode::NOT_FOUND,
        DbError::VersionConflict { .. } | DbError::EmailTaken(_) => StatusCode::CONFLICT,
        DbError::Timeout(_) => StatusCode::SERVICE_UNAVAILABLE,
        DbError::CoreError(e) => status_for_core(e),
    }
}

fn status_for_core(err: &confab_core::error::CoreError) -> StatusCode {
    match err {
        confab_core::error::CoreError::ValidationError(_)
        | confab_core::error::CoreError::ParseError(_) => StatusCode::BAD_REQUEST,
        confab_core::error::CoreError::NotFound(_) => StatusCode::NOT_FOUND,
        confab_core::error::CoreError::InvalidConfiguration(_)
        | confab_core::error::CoreError::InvariantViolation(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// ## Summary
/// Writes an error onto the response with its mapped status code.
///
/// Client errors echo their message; server errors log it and return an
/// opaque body instead.
pub fn write_error(res: &mut salvo::Response, err: &AppError) {
    let status = status_for(err);
    res.status_code(status);

    if status.is_server_error() {
        tracing::error!(error = ?err, "Request failed");
        res.render(Json(ErrorResponse {
            error: "Internal server error".to_owned(),
        }));
    } else {
        tracing::debug!(error = %err, status = %status, "Request rejected");
        res.render(Json(ErrorResponse {
            error: err.to_string(),
        }));
    }
}
