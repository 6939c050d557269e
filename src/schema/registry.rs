//! Schema registry for content types and components
//!
//! - One JSON file per schema under the configured schema directory
//! - Schemas are immutable once registered
//! - Lookups never fail: an unknown uid resolves to `None`

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::errors::{SchemaError, SchemaResult};
use super::types::ContentSchema;

/// Resolves schema uids to their definitions.
///
/// Passed explicitly to the reference collector; there is no process-wide
/// registry.
pub trait SchemaLookup: Send + Sync {
    /// Returns the schema for `uid`, or `None` when it is unknown
    fn lookup(&self, uid: &str) -> Option<&ContentSchema>;
}

impl SchemaLookup for HashMap<String, ContentSchema> {
    fn lookup(&self, uid: &str) -> Option<&ContentSchema> {
        self.get(uid)
    }
}

impl SchemaLookup for BTreeMap<String, ContentSchema> {
    fn lookup(&self, uid: &str) -> Option<&ContentSchema> {
        self.get(uid)
    }
}

/// Registry that reads schema files from disk and keeps them in memory.
pub struct SchemaRegistry {
    schema_dir: PathBuf,
    schemas: BTreeMap<String, ContentSchema>,
}

impl SchemaRegistry {
    /// Creates an empty registry backed by `schema_dir`.
    pub fn new(schema_dir: impl Into<PathBuf>) -> Self {
        Self {
            schema_dir: schema_dir.into(),
            schemas: BTreeMap::new(),
        }
    }

    /// Creates a registry from schemas already in memory.
    pub fn from_schemas(schemas: impl IntoIterator<Item = ContentSchema>) -> SchemaResult<Self> {
        let mut registry = Self::new(PathBuf::new());
        for schema in schemas {
            registry.register(schema)?;
        }
        Ok(registry)
    }

    /// Returns the schema directory path.
    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    /// Loads every `*.json` file in the schema directory.
    ///
    /// A missing directory yields an empty registry.
    pub fn load_all(&mut self) -> SchemaResult<()> {
        if !self.schema_dir.exists() {
            return Ok(());
        }

        let entries = fs::read_dir(&self.schema_dir).map_err(|e| {
            SchemaError::malformed(
                self.schema_dir.display().to_string(),
                format!("Failed to read schema directory: {}", e),
            )
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                SchemaError::malformed(
                    self.schema_dir.display().to_string(),
                    format!("Failed to read directory entry: {}", e),
                )
            })?;
            let path = entry.path();
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            paths.push(path);
        }

        // Stable load order keeps duplicate detection deterministic
        paths.sort();
        for path in paths {
            self.load_schema_file(&path)?;
        }

        debug!(count = self.schemas.len(), dir = %self.schema_dir.display(), "schemas loaded");
        Ok(())
    }

    fn load_schema_file(&mut self, path: &Path) -> SchemaResult<()> {
        let content = fs::read_to_string(path).map_err(|e| {
            SchemaError::malformed(path.display().to_string(), format!("Failed to read file: {}", e))
        })?;

        let schema: ContentSchema = serde_json::from_str(&content).map_err(|e| {
            SchemaError::malformed(path.display().to_string(), format!("Invalid JSON: {}", e))
        })?;

        schema
            .validate_structure()
            .map_err(|e| SchemaError::malformed(path.display().to_string(), e))?;

        self.insert(schema)
    }

    /// Registers a schema directly.
    pub fn register(&mut self, schema: ContentSchema) -> SchemaResult<()> {
        schema
            .validate_structure()
            .map_err(|e| SchemaError::malformed("<in-memory>", e))?;
        self.insert(schema)
    }

    fn insert(&mut self, schema: ContentSchema) -> SchemaResult<()> {
        if self.schemas.contains_key(&schema.uid) {
            return Err(SchemaError::duplicate(&schema.uid));
        }
        self.schemas.insert(schema.uid.clone(), schema);
        Ok(())
    }

    /// Gets a schema by uid.
    pub fn get(&self, uid: &str) -> Option<&ContentSchema> {
        self.schemas.get(uid)
    }

    /// Returns all registered uids in order.
    pub fn uids(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    /// Returns the number of registered schemas.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Returns whether the registry holds no schemas.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

impl SchemaLookup for SchemaRegistry {
    fn lookup(&self, uid: &str) -> Option<&ContentSchema> {
        self.get(uid)
    }
}
