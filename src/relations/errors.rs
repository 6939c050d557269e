//! # Relation Validation Errors

use thiserror::Error;

use super::reference::{join_ids, ReferenceId};
use crate::store::StoreError;

/// Result type for relation validation
pub type RelationResult<T> = Result<T, RelationError>;

/// Relation validation errors
#[derive(Debug, Clone, Error)]
pub enum RelationError {
    /// Some referenced ids do not exist in their target collection
    #[error(
        "Relations of type {collection} associated with this entity do not exist. IDs: {}",
        join_ids(.ids)
    )]
    MissingReferences {
        collection: String,
        ids: Vec<ReferenceId>,
    },

    /// A payload value has a shape the collector cannot read
    #[error("Malformed value at '{path}': {reason}")]
    MalformedPayload { path: String, reason: String },

    /// Storage lookup failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RelationError {
    /// Get the error code
    pub fn code(&self) -> &'static str {
        match self {
            RelationError::MissingReferences { .. } => "AERO_CMS_RELATION_NOT_FOUND",
            RelationError::MalformedPayload { .. } => "AERO_CMS_MALFORMED_PAYLOAD",
            RelationError::Store(e) => e.code(),
        }
    }

    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            RelationError::MissingReferences { .. } => 400,
            RelationError::MalformedPayload { .. } => 400,
            RelationError::Store(e) => e.status_code(),
        }
    }

    /// Whether the caller sent something invalid, as opposed to a system fault
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}
