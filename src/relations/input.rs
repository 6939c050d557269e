//! Parsed shapes of relation and media payload values
//!
//! Payload values are inspected once here and turned into explicit variants;
//! the collector only ever sees these types.

use serde_json::Value;

use super::reference::ReferenceId;

/// Returns true for values that carry nothing to validate:
/// `null`, `false`, `0`, `""` and `[]`.
///
/// A literal `0` id is therefore never checked against storage.
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(_) => false,
    }
}

/// A relation attribute value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationInput {
    /// `{ "connect": [...], "set": [...], "disconnect": [...] }`.
    /// Disconnected ids are not referenced by the write and are dropped.
    Mutation {
        connect: Vec<ReferenceId>,
        set: Vec<ReferenceId>,
    },
    /// `[1, 2]`
    Direct(Vec<ReferenceId>),
    /// `5`, `"5"` or `{ "id": 5 }`. Only checked when the collector opts in.
    Single(ReferenceId),
}

impl RelationInput {
    pub fn parse(value: &Value) -> Result<Self, String> {
        match value {
            Value::Array(items) => items
                .iter()
                .map(reference_entry)
                .collect::<Result<Vec<_>, _>>()
                .map(RelationInput::Direct),
            Value::Number(_) | Value::String(_) => {
                reference_entry(value).map(RelationInput::Single)
            }
            Value::Object(fields) => {
                let is_mutation = ["connect", "set", "disconnect"]
                    .iter()
                    .any(|key| fields.contains_key(*key));

                if is_mutation {
                    Ok(RelationInput::Mutation {
                        connect: reference_list(fields.get("connect"), "connect")?,
                        set: reference_list(fields.get("set"), "set")?,
                    })
                } else if fields.contains_key("id") {
                    reference_entry(value).map(RelationInput::Single)
                } else if fields.is_empty() {
                    Ok(RelationInput::Direct(Vec::new()))
                } else {
                    Err("expected 'connect', 'set' or 'id' in relation object".into())
                }
            }
            Value::Bool(_) | Value::Null => Err(format!("expected relation ids, got {}", value)),
        }
    }

    /// All referenced ids, `connect` before `set`
    pub fn into_ids(self) -> Vec<ReferenceId> {
        match self {
            RelationInput::Mutation { mut connect, set } => {
                connect.extend(set);
                connect
            }
            RelationInput::Direct(ids) => ids,
            RelationInput::Single(id) => vec![id],
        }
    }
}

/// A media attribute value: one file or a list of files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaInput(Vec<ReferenceId>);

impl MediaInput {
    pub fn parse(value: &Value) -> Result<Self, String> {
        match value {
            Value::Array(items) => items
                .iter()
                .map(reference_entry)
                .collect::<Result<Vec<_>, _>>()
                .map(MediaInput),
            single => reference_entry(single).map(|id| MediaInput(vec![id])),
        }
    }

    pub fn into_ids(self) -> Vec<ReferenceId> {
        self.0
    }
}

/// `{ "id": x }` or a bare scalar id
fn reference_entry(entry: &Value) -> Result<ReferenceId, String> {
    let raw = match entry {
        Value::Object(fields) => fields
            .get("id")
            .ok_or_else(|| "reference object has no 'id'".to_string())?,
        other => other,
    };
    ReferenceId::from_value(raw).ok_or_else(|| format!("expected an id, got {}", raw))
}

fn reference_list(list: Option<&Value>, key: &str) -> Result<Vec<ReferenceId>, String> {
    match list {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items.iter().map(reference_entry).collect(),
        Some(other) => Err(format!("'{}' must be an array, got {}", key, other)),
    }
}
