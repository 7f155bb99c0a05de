use thiserror::Error;

/// Domain-level failures that map to client-facing status codes.
/// Anything else bubbling up through anyhow is a storage/internal error.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> anyhow::Error {
        AppError::Validation(msg.into()).into()
    }

    pub fn not_found(what: &'static str) -> anyhow::Error {
        AppError::NotFound(what).into()
    }

    pub fn conflict(msg: impl Into<String>) -> anyhow::Error {
        AppError::Conflict(msg.into()).into()
    }
}
