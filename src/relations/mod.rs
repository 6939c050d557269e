//! Relation and media reference integrity
//!
//! Checks, before a create or update is persisted, that every entity the
//! payload points at exists:
//!
//! 1. `ReferenceCollector` walks the payload against its schema, descending
//!    into components and dynamic zones, and buckets referenced ids by
//!    target collection.
//! 2. `ExistenceVerifier` issues one batched lookup per bucket.
//! 3. `RelationValidator` runs the lookups concurrently and rejects the write
//!    with the first `MissingReferences` error.
//!
//! Validation never mutates data.

mod collector;
mod errors;
mod input;
mod reference;
mod validator;
mod verifier;

pub use collector::{
    CollectOptions, MalformedPolicy, ReferenceCollector, COMPONENT_TYPE_KEY, MEDIA_COLLECTION_UID,
};
pub use errors::{RelationError, RelationResult};
pub use input::{is_falsy, MediaInput, RelationInput};
pub use reference::{dedup_ids, join_ids, ReferenceBucket, ReferenceBuckets, ReferenceId};
pub use validator::{validate_relations, RelationValidator, ValidationOutcome};
pub use verifier::ExistenceVerifier;
