//! Referenced ids and their per-collection buckets

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

/// Id of a referenced record.
///
/// Numeric strings are coerced to numbers when parsed, so `"5"` and `5`
/// name the same record. Anything else is kept verbatim; it can never match
/// a stored id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum ReferenceId {
    Numeric(u64),
    Opaque(String),
}

impl ReferenceId {
    /// Reads an id from a JSON scalar. Non-scalars yield `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => {
                if let Some(id) = n.as_u64() {
                    return Some(ReferenceId::Numeric(id));
                }
                match n.as_f64() {
                    Some(f) if f >= 0.0 && f.fract() == 0.0 && f < u64::MAX as f64 => {
                        Some(ReferenceId::Numeric(f as u64))
                    }
                    _ => Some(ReferenceId::Opaque(n.to_string())),
                }
            }
            Value::String(s) => Some(match s.trim().parse::<u64>() {
                Ok(id) => ReferenceId::Numeric(id),
                Err(_) => ReferenceId::Opaque(s.clone()),
            }),
            _ => None,
        }
    }

    /// Storage-native id, if this id has one
    pub fn as_numeric(&self) -> Option<u64> {
        match self {
            ReferenceId::Numeric(id) => Some(*id),
            ReferenceId::Opaque(_) => None,
        }
    }
}

impl fmt::Display for ReferenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceId::Numeric(id) => write!(f, "{}", id),
            ReferenceId::Opaque(raw) => write!(f, "{}", raw),
        }
    }
}

impl From<u64> for ReferenceId {
    fn from(id: u64) -> Self {
        ReferenceId::Numeric(id)
    }
}

/// Drops repeated ids, keeping first-seen order.
pub fn dedup_ids(ids: &[ReferenceId]) -> Vec<ReferenceId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().filter(|id| seen.insert(*id)).cloned().collect()
}

/// Comma-joined id list as used in error messages
pub fn join_ids(ids: &[ReferenceId]) -> String {
    ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(",")
}

/// Every id referenced toward one collection, in encounter order.
///
/// Duplicates are kept here; verification deduplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceBucket {
    ids: Vec<ReferenceId>,
}

impl ReferenceBucket {
    pub fn ids(&self) -> &[ReferenceId] {
        &self.ids
    }

    pub fn unique(&self) -> Vec<ReferenceId> {
        dedup_ids(&self.ids)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Buckets keyed by target collection uid
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceBuckets {
    buckets: BTreeMap<String, ReferenceBucket>,
}

impl ReferenceBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends ids to the bucket of `collection`. Empty input creates no bucket.
    pub fn extend(&mut self, collection: &str, ids: impl IntoIterator<Item = ReferenceId>) {
        let mut ids = ids.into_iter().peekable();
        if ids.peek().is_none() {
            return;
        }
        self.buckets
            .entry(collection.to_string())
            .or_default()
            .ids
            .extend(ids);
    }

    pub fn get(&self, collection: &str) -> Option<&ReferenceBucket> {
        self.buckets.get(collection)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ReferenceBucket)> {
        self.buckets.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of distinct target collections
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Deduplicated view, `{"<uid>": [ids...]}`
    pub fn to_json(&self) -> Value {
        let mut out = Map::new();
        for (collection, bucket) in &self.buckets {
            let ids = bucket
                .unique()
                .into_iter()
                .map(|id| match id {
                    ReferenceId::Numeric(n) => Value::from(n),
                    ReferenceId::Opaque(s) => Value::String(s),
                })
                .collect();
            out.insert(collection.clone(), Value::Array(ids));
        }
        Value::Object(out)
    }
}
