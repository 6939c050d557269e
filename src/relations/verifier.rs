//! Existence verification for one target collection
//!
//! One batched `find_with_count` per collection. The match count is compared
//! to the number of distinct requested ids; only on a mismatch are the
//! returned records inspected to name the missing ids.

use std::collections::HashSet;

use serde_json::Value;
use tracing::{debug, warn};

use super::errors::{RelationError, RelationResult};
use super::reference::{dedup_ids, ReferenceId};
use crate::store::{FindQuery, StorageQuery};

/// Checks referenced ids against storage.
pub struct ExistenceVerifier<'a, S: StorageQuery + ?Sized> {
    store: &'a S,
}

impl<'a, S: StorageQuery + ?Sized> ExistenceVerifier<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Fails with `MissingReferences` listing every id of `ids` that
    /// `collection` does not contain.
    pub async fn verify(&self, collection: &str, ids: &[ReferenceId]) -> RelationResult<()> {
        let missing = self.missing(collection, ids).await?;
        if missing.is_empty() {
            return Ok(());
        }
        Err(RelationError::MissingReferences {
            collection: collection.to_string(),
            ids: missing,
        })
    }

    /// Ids of `ids` not found in `collection`, deduplicated, in request order.
    pub async fn missing(
        &self,
        collection: &str,
        ids: &[ReferenceId],
    ) -> RelationResult<Vec<ReferenceId>> {
        let requested = dedup_ids(ids);
        if requested.is_empty() {
            return Ok(Vec::new());
        }

        // Non-numeric ids cannot exist in storage and are not sent
        let numeric: Vec<u64> = requested.iter().filter_map(ReferenceId::as_numeric).collect();
        let (records, count) = if numeric.is_empty() {
            (Vec::new(), 0)
        } else {
            let query = FindQuery::ids_in(numeric);
            self.store.find_with_count(collection, &query).await?
        };

        debug!(collection, requested = requested.len(), found = count, "verified references");
        if count == requested.len() {
            return Ok(Vec::new());
        }

        let found: HashSet<u64> = records.iter().filter_map(record_id).collect();
        let missing: Vec<ReferenceId> = requested
            .into_iter()
            .filter(|id| id.as_numeric().map_or(true, |n| !found.contains(&n)))
            .collect();

        if missing.is_empty() {
            warn!(collection, count, "match count differs from request but every id was found");
        }
        Ok(missing)
    }
}

fn record_id(record: &Value) -> Option<u64> {
    record
        .get("id")
        .and_then(ReferenceId::from_value)
        .and_then(|id| id.as_numeric())
}
