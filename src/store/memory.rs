//! In-memory store
//!
//! Records are JSON objects keyed by numeric id within each collection.
//! Every `find_with_count` call is recorded so callers can observe how
//! lookups were batched.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, RwLock};

use serde_json::{Map, Value};

use super::errors::{StoreError, StoreResult};
use super::query::FindQuery;
use super::{EntityStore, StorageQuery, StoreFuture};

type Collection = BTreeMap<u64, Map<String, Value>>;

/// One observed existence lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRecord {
    pub collection: String,
    pub ids: Vec<u64>,
}

/// In-memory store for tests and the CLI
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<BTreeMap<String, Collection>>,
    lookups: Mutex<Vec<LookupRecord>>,
}

fn poisoned() -> StoreError {
    StoreError::Internal("Lock poisoned".to_string())
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds bare records with the given ids to `collection`.
    pub fn with_ids(self, collection: &str, ids: impl IntoIterator<Item = u64>) -> Self {
        if let Ok(mut collections) = self.collections.write() {
            let records = collections.entry(collection.to_string()).or_default();
            for id in ids {
                let mut record = Map::new();
                record.insert("id".into(), Value::from(id));
                records.insert(id, record);
            }
        }
        self
    }

    /// Inserts a record, keeping its `id` if it has one.
    pub fn put_record(&self, collection: &str, record: Value) -> StoreResult<u64> {
        let Value::Object(mut fields) = record else {
            return Err(StoreError::InvalidRecord {
                collection: collection.to_string(),
                reason: "record must be a JSON object".into(),
            });
        };

        let mut collections = self.collections.write().map_err(|_| poisoned())?;
        let records = collections.entry(collection.to_string()).or_default();

        let id = match fields.get("id") {
            None => next_id(collection, records)?,
            Some(raw) => raw.as_u64().ok_or_else(|| StoreError::InvalidRecord {
                collection: collection.to_string(),
                reason: format!("id must be a positive integer, got {}", raw),
            })?,
        };
        fields.insert("id".into(), Value::from(id));
        records.insert(id, fields);
        Ok(id)
    }

    /// Gets a record by id.
    pub fn get(&self, collection: &str, id: u64) -> StoreResult<Option<Value>> {
        let collections = self.collections.read().map_err(|_| poisoned())?;
        Ok(collections
            .get(collection)
            .and_then(|records| records.get(&id))
            .map(|fields| Value::Object(fields.clone())))
    }

    /// Number of records in `collection`.
    pub fn count(&self, collection: &str) -> StoreResult<usize> {
        let collections = self.collections.read().map_err(|_| poisoned())?;
        Ok(collections.get(collection).map_or(0, BTreeMap::len))
    }

    /// Lookups issued so far, in call order.
    pub fn lookups(&self) -> Vec<LookupRecord> {
        self.lookups
            .lock()
            .map(|lookups| lookups.clone())
            .unwrap_or_default()
    }

    /// Loads a data file of shape `{"<uid>": [{"id": 1, ...}, ...]}`.
    pub fn load(path: &Path) -> StoreResult<Self> {
        let malformed = |reason: String| StoreError::MalformedDataFile {
            path: path.display().to_string(),
            reason,
        };

        let content = fs::read_to_string(path)?;
        let value: Value =
            serde_json::from_str(&content).map_err(|e| malformed(format!("Invalid JSON: {}", e)))?;
        let Value::Object(collections) = value else {
            return Err(malformed("top level must be an object".into()));
        };

        let store = Self::new();
        for (collection, records) in collections {
            let Value::Array(records) = records else {
                return Err(malformed(format!("collection '{}' must be an array", collection)));
            };
            for record in records {
                store.put_record(&collection, record)?;
            }
        }
        Ok(store)
    }

    /// Writes the store back in the data file format.
    pub fn save(&self, path: &Path) -> StoreResult<()> {
        let collections = self.collections.read().map_err(|_| poisoned())?;
        let mut out = Map::new();
        for (collection, records) in collections.iter() {
            let records = records.values().cloned().map(Value::Object).collect();
            out.insert(collection.clone(), Value::Array(records));
        }
        drop(collections);

        let content = serde_json::to_string_pretty(&Value::Object(out))
            .map_err(|e| StoreError::Internal(format!("Failed to serialize store: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }

    fn find_ids(&self, collection: &str, query: &FindQuery) -> StoreResult<(Vec<Value>, usize)> {
        self.lookups
            .lock()
            .map_err(|_| poisoned())?
            .push(LookupRecord {
                collection: collection.to_string(),
                ids: query.ids().to_vec(),
            });

        let collections = self.collections.read().map_err(|_| poisoned())?;
        let Some(records) = collections.get(collection) else {
            return Ok((Vec::new(), 0));
        };

        let mut found: Vec<u64> = query
            .ids()
            .iter()
            .copied()
            .filter(|id| records.contains_key(id))
            .collect();
        found.sort_unstable();
        found.dedup();

        let matches: Vec<Value> = found
            .iter()
            .filter_map(|id| records.get(id))
            .map(|fields| Value::Object(fields.clone()))
            .collect();
        let count = matches.len();
        Ok((matches, count))
    }
}

fn next_id(collection: &str, records: &Collection) -> StoreResult<u64> {
    match records.keys().next_back() {
        None => Ok(1),
        Some(last) => last.checked_add(1).ok_or_else(|| {
            StoreError::Internal(format!("No ids left in collection '{}'", collection))
        }),
    }
}

impl StorageQuery for MemoryStore {
    fn find_with_count<'a>(
        &'a self,
        collection: &'a str,
        query: &'a FindQuery,
    ) -> StoreFuture<'a, (Vec<Value>, usize)> {
        Box::pin(async move { self.find_ids(collection, query) })
    }
}

impl EntityStore for MemoryStore {
    fn insert<'a>(&'a self, collection: &'a str, mut data: Map<String, Value>) -> StoreFuture<'a, Value> {
        Box::pin(async move {
            // Ids are always assigned by the store on insert
            data.remove("id");
            let id = self.put_record(collection, Value::Object(data))?;
            self.get(collection, id)?.ok_or_else(|| StoreError::RecordNotFound {
                collection: collection.to_string(),
                id,
            })
        })
    }

    fn update<'a>(
        &'a self,
        collection: &'a str,
        id: u64,
        data: Map<String, Value>,
    ) -> StoreFuture<'a, Option<Value>> {
        Box::pin(async move {
            let mut collections = self.collections.write().map_err(|_| poisoned())?;
            let Some(record) = collections.get_mut(collection).and_then(|r| r.get_mut(&id)) else {
                return Ok(None);
            };
            for (key, value) in data {
                if key != "id" {
                    record.insert(key, value);
                }
            }
            Ok(Some(Value::Object(record.clone())))
        })
    }
}
