use thiserror::Error;
use todo_core::response::ResponseStatus;
use todo_core::ValidationError;
use todo_db::DbError;

/// Message returned to callers for anything classified as internal. Details
/// go to the log only.
pub(crate) const INTERNAL_MESSAGE: &str = "internal server error";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),

    /// Body could not be decoded.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// Body decoded but a field or parameter is unacceptable.
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// HTTP status code for this error.
    pub fn status(&self) -> u16 {
        match self {
            ServiceError::NotFound(_) => 404,
            ServiceError::InvalidPayload(_) => 422,
            ServiceError::BadRequest(_) => 400,
            ServiceError::Internal(_) => 500,
        }
    }

    /// Envelope tag for this error.
    pub fn code(&self) -> ResponseStatus {
        match self {
            ServiceError::NotFound(_) => ResponseStatus::NotFound,
            ServiceError::InvalidPayload(_) | ServiceError::BadRequest(_) => {
                ResponseStatus::InvalidPayload
            }
            ServiceError::Internal(_) => ResponseStatus::UnexpectedError,
        }
    }

    /// Caller-facing message, without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            ServiceError::NotFound(m)
            | ServiceError::InvalidPayload(m)
            | ServiceError::BadRequest(m)
            | ServiceError::Internal(m) => m,
        }
    }
}

impl From<DbError> for ServiceError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound => ServiceError::NotFound("not found".into()),
            _ => ServiceError::Internal(INTERNAL_MESSAGE.into()),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(e: ValidationError) -> Self {
        ServiceError::BadRequest(e.to_string())
    }
}
