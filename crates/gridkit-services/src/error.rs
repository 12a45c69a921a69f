use gridkit_core::GridError;
use thiserror::Error;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service-level errors with user-friendly messages
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response from column service: {0}")]
    InvalidResponse(String),

    #[error("Column '{0}' is protected and cannot be deleted")]
    ProtectedField(String),

    #[error("Saving column configuration failed: {0}")]
    SaveFailed(String),

    #[error("Schema change failed: {0}")]
    SchemaMutationFailed(String),

    #[error("Column service returned {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("No pending delete matches this confirmation")]
    ConfirmationMismatch,

    #[error(transparent)]
    Grid(#[from] GridError),
}
