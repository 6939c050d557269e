//! # Store Errors

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence layer errors
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Record not found: {collection}#{id}")]
    RecordNotFound { collection: String, id: u64 },

    #[error("Invalid record in '{collection}': {reason}")]
    InvalidRecord { collection: String, reason: String },

    #[error("Malformed data file '{path}': {reason}")]
    MalformedDataFile { path: String, reason: String },

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Get the error code
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::RecordNotFound { .. } => "AERO_CMS_RECORD_NOT_FOUND",
            StoreError::InvalidRecord { .. } => "AERO_CMS_INVALID_RECORD",
            StoreError::MalformedDataFile { .. } => "AERO_CMS_MALFORMED_DATA_FILE",
            StoreError::IoError(_) => "AERO_CMS_IO_ERROR",
            StoreError::Internal(_) => "AERO_CMS_INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            StoreError::RecordNotFound { .. } => 404,
            StoreError::InvalidRecord { .. } => 400,
            StoreError::MalformedDataFile { .. } => 500,
            StoreError::IoError(_) => 500,
            StoreError::Internal(_) => 500,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::IoError(e.to_string())
    }
}
