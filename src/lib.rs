//! aerocms - content entries whose relation and media references are
//! checked against storage before every write
//!
//! - `schema`: content type definitions and the registry that loads them
//! - `relations`: reference collection and batched existence checks
//! - `store`: storage query seam and the in-memory store
//! - `entity`: create/update service running validation before persistence
//! - `webhooks`: webhook records and form validation

pub mod cli;
pub mod config;
pub mod entity;
pub mod observability;
pub mod relations;
pub mod schema;
pub mod store;
pub mod webhooks;
