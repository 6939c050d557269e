//! Write operations
//!
//! Creates and updates expressed as data, so they can be read from JSON
//! requests and dispatched through one entry point.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A create or update against one content type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum WriteOp {
    Create(CreateOp),
    Update(UpdateOp),
}

impl WriteOp {
    /// Content type uid written to
    pub fn uid(&self) -> &str {
        match self {
            Self::Create(c) => &c.uid,
            Self::Update(u) => &u.uid,
        }
    }

    /// Candidate payload
    pub fn data(&self) -> &Value {
        match self {
            Self::Create(c) => &c.data,
            Self::Update(u) => &u.data,
        }
    }

    /// Operation name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::Create(_) => "create",
            Self::Update(_) => "update",
        }
    }
}

/// Insert a new entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOp {
    pub uid: String,
    pub data: Value,
}

/// Update an existing entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateOp {
    pub uid: String,
    pub id: u64,
    pub data: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_tagged_ops() {
        let op: WriteOp = serde_json::from_value(json!({
            "op": "update",
            "uid": "api::article.article",
            "id": 3,
            "data": { "title": "Hello" }
        }))
        .unwrap();

        assert_eq!(op.name(), "update");
        assert_eq!(op.uid(), "api::article.article");
        assert_eq!(op.data()["title"], json!("Hello"));
        assert!(matches!(op, WriteOp::Update(UpdateOp { id: 3, .. })));
    }

    #[test]
    fn test_unknown_op_rejected() {
        let result: Result<WriteOp, _> =
            serde_json::from_value(json!({ "op": "delete", "uid": "x", "data": {} }));
        assert!(result.is_err());
    }
}
