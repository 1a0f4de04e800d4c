/// Domain failures, independent of transport.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Licence not found: {0}")]
    LicenceNotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
