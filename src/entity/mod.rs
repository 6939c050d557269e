//! Entity writes
//!
//! The write path for content entities: resolve the content type, validate
//! every relation and media reference, then persist.

mod context;
mod errors;
mod operation;
mod service;

pub use context::WriteContext;
pub use errors::{EntityError, EntityResult};
pub use operation::{CreateOp, UpdateOp, WriteOp};
pub use service::EntityService;
