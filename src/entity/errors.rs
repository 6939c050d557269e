//! Entity write errors

use thiserror::Error;

use crate::relations::RelationError;
use crate::store::StoreError;

/// Entity write result type
pub type EntityResult<T> = Result<T, EntityError>;

/// Errors surfaced to the caller of a create or update
#[derive(Debug, Clone, Error)]
pub enum EntityError {
    /// No schema registered for the content type
    #[error("Unknown content type: {0}")]
    UnknownContentType(String),

    /// Payload is not a JSON object
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Entity to update does not exist
    #[error("Entity not found: {uid}#{id}")]
    NotFound { uid: String, id: u64 },

    /// Reference validation rejected the write
    #[error("{0}")]
    Validation(#[from] RelationError),

    /// Persistence failed
    #[error("{0}")]
    Store(#[from] StoreError),
}

impl EntityError {
    /// Get error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownContentType(_) => "AERO_CMS_UNKNOWN_CONTENT_TYPE",
            Self::InvalidPayload(_) => "AERO_CMS_INVALID_PAYLOAD",
            Self::NotFound { .. } => "AERO_CMS_ENTITY_NOT_FOUND",
            Self::Validation(e) => e.code(),
            Self::Store(e) => e.code(),
        }
    }

    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            Self::UnknownContentType(_) => 404,
            Self::InvalidPayload(_) => 400,
            Self::NotFound { .. } => 404,
            Self::Validation(e) => e.status_code(),
            Self::Store(e) => e.status_code(),
        }
    }

    /// Whether this is an application error the end caller should see
    pub fn is_application_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}
