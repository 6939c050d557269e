//! Configuration file handling
//!
//! `aerocms.json`:
//! - `schema_dir` (required): directory of content schema files
//! - `data_file` (optional): JSON data file backing the store
//! - `media_collection` (default `plugin::upload.file`)
//! - `malformed_payload`: `reject` (default) or `ignore`
//! - `single_relation_ids` (default false): check `5` / `{"id": 5}` relation values
//! - `log_format`: `json` (default) or `pretty`
//! - `log_level` (default `info`), overridden by `RUST_LOG`

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::relations::{CollectOptions, MalformedPolicy, MEDIA_COLLECTION_UID};

/// Configuration errors
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {reason}")]
    Unreadable { path: String, reason: String },

    #[error("Invalid config JSON: {0}")]
    InvalidJson(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per event
    #[default]
    Json,
    /// Human-readable lines
    Pretty,
}

/// Configuration file structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Content schema directory (required)
    pub schema_dir: PathBuf,

    /// Data file for the store (optional)
    #[serde(default)]
    pub data_file: Option<PathBuf>,

    /// Collection shared by every media attribute
    #[serde(default = "default_media_collection")]
    pub media_collection: String,

    /// Handling of unreadable payload shapes
    #[serde(default)]
    pub malformed_payload: MalformedPolicy,

    /// Check relation values given as one bare id
    #[serde(default)]
    pub single_relation_ids: bool,

    #[serde(default)]
    pub log_format: LogFormat,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_media_collection() -> String {
    MEDIA_COLLECTION_UID.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json(&content)
    }

    /// Parse and validate configuration JSON
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: Config =
            serde_json::from_str(content).map_err(|e| ConfigError::InvalidJson(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.schema_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("schema_dir must not be empty".into()));
        }
        if self.media_collection.trim().is_empty() {
            return Err(ConfigError::Invalid("media_collection must not be empty".into()));
        }
        Ok(())
    }

    /// Collector settings derived from this configuration
    pub fn collect_options(&self) -> CollectOptions {
        CollectOptions {
            media_collection: self.media_collection.clone(),
            malformed: self.malformed_payload,
            single_relation_ids: self.single_relation_ids,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::from_json(r#"{"schema_dir": "./schemas"}"#).unwrap();
        assert_eq!(config.schema_dir, PathBuf::from("./schemas"));
        assert!(config.data_file.is_none());
        assert_eq!(config.media_collection, MEDIA_COLLECTION_UID);
        assert_eq!(config.malformed_payload, MalformedPolicy::Reject);
        assert!(!config.collect_options().single_relation_ids);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_json(
            r#"{
                "schema_dir": "s",
                "data_file": "data.json",
                "media_collection": "plugin::assets.asset",
                "malformed_payload": "ignore",
                "single_relation_ids": true,
                "log_format": "pretty",
                "log_level": "debug"
            }"#,
        )
        .unwrap();

        let options = config.collect_options();
        assert_eq!(options.media_collection, "plugin::assets.asset");
        assert_eq!(options.malformed, MalformedPolicy::Ignore);
        assert!(options.single_relation_ids);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            Config::from_json(r#"{"schema_dir": ""}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Config::from_json(r#"{"schema_dir": "s", "media_collection": " "}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Config::from_json(r#"{"schema_dir": "s", "malformed_payload": "explode"}"#),
            Err(ConfigError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = Config::load(&temp_dir.path().join("aerocms.json")).unwrap_err();
        assert!(err.to_string().contains("aerocms.json"));
    }
}
