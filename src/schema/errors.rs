//! Schema registry error types
//!
//! Error codes:
//! - AERO_CMS_SCHEMA_DUPLICATE (REJECT)
//! - AERO_CMS_SCHEMA_MALFORMED (FATAL at startup)
//!
//! An unknown schema uid is not an error for reference collection; the
//! registry simply returns nothing for it.

use std::fmt;

/// Severity levels for schema errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Request rejected, process keeps running
    Reject,
    /// Registry cannot be built; startup must abort
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Schema registry error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// A schema with the same uid is already registered
    AeroCmsSchemaDuplicate,
    /// Schema file unreadable or structurally invalid
    AeroCmsSchemaMalformed,
}

impl SchemaErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::AeroCmsSchemaDuplicate => "AERO_CMS_SCHEMA_DUPLICATE",
            SchemaErrorCode::AeroCmsSchemaMalformed => "AERO_CMS_SCHEMA_MALFORMED",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            SchemaErrorCode::AeroCmsSchemaDuplicate => Severity::Reject,
            SchemaErrorCode::AeroCmsSchemaMalformed => Severity::Fatal,
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Schema error with context
#[derive(Debug)]
pub struct SchemaError {
    code: SchemaErrorCode,
    message: String,
    uid: Option<String>,
}

impl SchemaError {
    /// Create a duplicate schema error
    pub fn duplicate(uid: impl Into<String>) -> Self {
        let uid = uid.into();
        Self {
            code: SchemaErrorCode::AeroCmsSchemaDuplicate,
            message: format!("Schema '{}' is already registered", uid),
            uid: Some(uid),
        }
    }

    /// Create an error for a malformed schema file
    pub fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::AeroCmsSchemaMalformed,
            message: format!("Malformed schema '{}': {}", path.into(), reason.into()),
            uid: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the schema uid if applicable
    pub fn uid(&self) -> Option<&str> {
        self.uid.as_deref()
    }

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(SchemaErrorCode::AeroCmsSchemaDuplicate.code(), "AERO_CMS_SCHEMA_DUPLICATE");
        assert_eq!(SchemaErrorCode::AeroCmsSchemaMalformed.code(), "AERO_CMS_SCHEMA_MALFORMED");
    }

    #[test]
    fn test_severity_levels() {
        assert!(!SchemaError::duplicate("api::user.user").is_fatal());
        assert!(SchemaError::malformed("x.json", "bad").is_fatal());
    }

    #[test]
    fn test_display_includes_code() {
        let err = SchemaError::duplicate("api::user.user");
        let display = err.to_string();
        assert!(display.contains("REJECT"));
        assert!(display.contains("AERO_CMS_SCHEMA_DUPLICATE"));
        assert!(display.contains("api::user.user"));
        assert_eq!(err.uid(), Some("api::user.user"));
    }
}
