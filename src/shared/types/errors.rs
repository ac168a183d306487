use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation: {0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    /// Access denied by the portal policy. The message is user-facing as is.
    #[error("{0}")]
    Forbidden(String),

    /// The hosted backend rejected or failed a request.
    #[error("{0}")]
    Backend(String),
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
