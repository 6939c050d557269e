//! # Store
//!
//! Persistence seams consumed by reference verification and entity writes.
//! The production executor lives elsewhere; [`MemoryStore`] backs tests and
//! the CLI.

mod errors;
mod memory;
mod query;

pub use errors::{StoreError, StoreResult};
pub use memory::{LookupRecord, MemoryStore};
pub use query::{FindQuery, IdFilter, WhereClause};

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::{Map, Value};

/// Boxed future returned by store operations
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = StoreResult<T>> + Send + 'a>>;

/// Read side: batched existence lookups
pub trait StorageQuery: Send + Sync {
    /// Fetch every record of `collection` matching `query`, plus the match count
    fn find_with_count<'a>(
        &'a self,
        collection: &'a str,
        query: &'a FindQuery,
    ) -> StoreFuture<'a, (Vec<Value>, usize)>;
}

/// Write side: used by the entity service once validation has passed
pub trait EntityStore: Send + Sync {
    /// Insert a new record, assigning its id
    fn insert<'a>(&'a self, collection: &'a str, data: Map<String, Value>) -> StoreFuture<'a, Value>;

    /// Merge `data` into an existing record; `None` if it does not exist
    fn update<'a>(
        &'a self,
        collection: &'a str,
        id: u64,
        data: Map<String, Value>,
    ) -> StoreFuture<'a, Option<Value>>;
}

impl<T: StorageQuery + ?Sized> StorageQuery for Arc<T> {
    fn find_with_count<'a>(
        &'a self,
        collection: &'a str,
        query: &'a FindQuery,
    ) -> StoreFuture<'a, (Vec<Value>, usize)> {
        (**self).find_with_count(collection, query)
    }
}

impl<T: EntityStore + ?Sized> EntityStore for Arc<T> {
    fn insert<'a>(&'a self, collection: &'a str, data: Map<String, Value>) -> StoreFuture<'a, Value> {
        (**self).insert(collection, data)
    }

    fn update<'a>(
        &'a self,
        collection: &'a str,
        id: u64,
        data: Map<String, Value>,
    ) -> StoreFuture<'a, Option<Value>> {
        (**self).update(collection, id, data)
    }
}
