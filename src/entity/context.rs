//! Write Context
//!
//! Carried through a single create or update for observability.

use std::time::Instant;

use uuid::Uuid;

/// Context of one entity write
#[derive(Debug, Clone)]
pub struct WriteContext {
    /// Request ID for tracing
    pub request_id: Uuid,

    /// Start time for duration tracking
    started_at: Instant,
}

impl WriteContext {
    /// Create a new write context with a fresh request id
    pub fn new() -> Self {
        Self::with_request_id(Uuid::new_v4())
    }

    /// Create a context for an existing request id
    pub fn with_request_id(request_id: Uuid) -> Self {
        Self {
            request_id,
            started_at: Instant::now(),
        }
    }

    /// Get elapsed time in milliseconds
    pub fn elapsed_ms(&self) -> u128 {
        self.started_at.elapsed().as_millis()
    }
}

impl Default for WriteContext {
    fn default() -> Self {
        Self::new()
    }
}
