//! Content schema subsystem
//!
//! Schemas describe content types and components. They are read-only input
//! to reference collection and are resolved through [`SchemaLookup`].

mod errors;
mod registry;
mod types;

pub use errors::{SchemaError, SchemaErrorCode, SchemaResult, Severity};
pub use registry::{SchemaLookup, SchemaRegistry};
pub use types::{AttributeDefinition, AttributeKind, ContentSchema};
