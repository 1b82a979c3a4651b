//! Error types for the ledger mirror

pub use sea_orm::DbErr;
use thiserror::Error;

/// Result type alias for mirror operations
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Errors that can occur while reading or writing the mirror
#[derive(Debug, Error)]
pub enum MirrorError {
    /// Required input missing or malformed
    #[error("{0}")]
    Validation(String),

    /// Amount is not a non-negative integer or does not fit in 256 bits
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Referenced project is not mirrored
    #[error("Project not found")]
    ProjectNotFound(i64),

    /// Underlying storage failure
    #[error("Database error: {0}")]
    Persistence(#[from] DbErr),
}

impl MirrorError {
    pub fn validation(message: impl Into<String>) -> Self {
        MirrorError::Validation(message.into())
    }
}
