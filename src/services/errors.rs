use thiserror::Error;

/// Generic error type used by service layer functions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// Requested category was not found.
    #[error("not found")]
    NotFound,
    /// The displayed catalog is behind the store; reload before retrying.
    #[error("catalog changed, reload required")]
    Conflict,
    /// The store could not be reached; the caller may retry.
    #[error("store unavailable")]
    Unavailable,
    /// Submitted form data was rejected.
    #[error("{0}")]
    Form(String),
    /// An unexpected internal error occurred.
    #[error("internal error")]
    Internal,
}

/// Convenient alias for results returned from service functions.
pub type ServiceResult<T> = Result<T, ServiceError>;
