//! Relation validation entry point
//!
//! Collection runs first and synchronously. Buckets are then verified
//! concurrently, one storage lookup per target collection. The first failing
//! bucket rejects the write; sibling lookups still in flight are dropped.

use std::collections::BTreeMap;

use futures_util::future::{join_all, try_join_all};
use serde_json::Value;
use tracing::{debug, info};

use super::collector::{CollectOptions, ReferenceCollector};
use super::errors::{RelationError, RelationResult};
use super::reference::{ReferenceBuckets, ReferenceId};
use super::verifier::ExistenceVerifier;
use crate::schema::SchemaLookup;
use crate::store::StorageQuery;

/// Every missing reference of a payload, grouped by collection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOutcome {
    missing: BTreeMap<String, Vec<ReferenceId>>,
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        self.missing.is_empty()
    }

    /// Missing ids per offending collection
    pub fn missing(&self) -> &BTreeMap<String, Vec<ReferenceId>> {
        &self.missing
    }

    /// First offending collection as an error, ordered by uid
    pub fn into_result(self) -> RelationResult<()> {
        match self.missing.into_iter().next() {
            None => Ok(()),
            Some((collection, ids)) => Err(RelationError::MissingReferences { collection, ids }),
        }
    }
}

/// Checks that every relation and media reference of a write exists.
pub struct RelationValidator<'a, L: SchemaLookup + ?Sized, S: StorageQuery + ?Sized> {
    lookup: &'a L,
    store: &'a S,
    options: &'a CollectOptions,
}

impl<'a, L, S> RelationValidator<'a, L, S>
where
    L: SchemaLookup + ?Sized,
    S: StorageQuery + ?Sized,
{
    pub fn new(lookup: &'a L, store: &'a S, options: &'a CollectOptions) -> Self {
        Self {
            lookup,
            store,
            options,
        }
    }

    /// Collects the references of `payload` without touching storage.
    pub fn collect(&self, payload: &Value, uid: &str) -> RelationResult<ReferenceBuckets> {
        ReferenceCollector::new(self.lookup, self.options).collect(payload, uid)
    }

    /// Succeeds when every reference exists, otherwise fails with the first
    /// `MissingReferences` error raised.
    pub async fn validate(&self, payload: &Value, uid: &str) -> RelationResult<()> {
        let buckets = self.collect(payload, uid)?;
        if buckets.is_empty() {
            debug!(uid, "no references to verify");
            return Ok(());
        }

        let verifier = ExistenceVerifier::new(self.store);
        let checks = buckets
            .iter()
            .map(|(collection, bucket)| verifier.verify(collection, bucket.ids()));
        try_join_all(checks).await?;

        info!(uid, collections = buckets.len(), "relations validated");
        Ok(())
    }

    /// Verifies every bucket to completion and reports all missing ids.
    ///
    /// Storage errors still abort the check.
    pub async fn check(&self, payload: &Value, uid: &str) -> RelationResult<ValidationOutcome> {
        let buckets = self.collect(payload, uid)?;
        let verifier = ExistenceVerifier::new(self.store);

        let checks = buckets.iter().map(|(collection, bucket)| {
            let verifier = &verifier;
            async move {
                let missing = verifier.missing(collection, bucket.ids()).await?;
                Ok::<_, RelationError>((collection, missing))
            }
        });

        let mut outcome = ValidationOutcome::default();
        for result in join_all(checks).await {
            let (collection, missing) = result?;
            if !missing.is_empty() {
                outcome.missing.insert(collection.to_string(), missing);
            }
        }
        Ok(outcome)
    }
}

/// Validates the references of `payload`, written as schema `uid`.
pub async fn validate_relations<L, S>(
    payload: &Value,
    uid: &str,
    lookup: &L,
    store: &S,
    options: &CollectOptions,
) -> RelationResult<()>
where
    L: SchemaLookup + ?Sized,
    S: StorageQuery + ?Sized,
{
    RelationValidator::new(lookup, store, options)
        .validate(payload, uid)
        .await
}
