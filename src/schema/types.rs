//! Content schema definitions
//!
//! Attribute kinds that matter for reference integrity:
//! - relation: points at another collection by id
//! - media: points at the upload store
//! - component: embeds a nested schema, singular or repeatable
//! - dynamiczone: array whose items each name their own component
//!
//! Every other attribute type (string, integer, json, ...) is a scalar.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute kind, tagged by the `type` key of the schema file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AttributeKind {
    /// Reference to entities of another collection
    Relation {
        /// Target collection uid; relations without one are never checked
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<String>,
        /// Relation cardinality as declared (oneToOne, manyToMany, ...)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        relation: Option<String>,
    },
    /// Reference to one or more upload records
    Media {
        #[serde(default)]
        multiple: bool,
    },
    /// Embedded component
    Component {
        /// Component schema uid
        component: String,
        #[serde(default)]
        repeatable: bool,
    },
    /// Array of components chosen per item
    #[serde(rename = "dynamiczone")]
    DynamicZone {
        /// Component uids allowed in the zone
        #[serde(default)]
        components: Vec<String>,
    },
    /// Any attribute that cannot reference another entity
    #[serde(other)]
    Scalar,
}

impl AttributeKind {
    /// Returns the type name for logs and error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            AttributeKind::Relation { .. } => "relation",
            AttributeKind::Media { .. } => "media",
            AttributeKind::Component { .. } => "component",
            AttributeKind::DynamicZone { .. } => "dynamiczone",
            AttributeKind::Scalar => "scalar",
        }
    }
}

/// A single attribute of a content schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    #[serde(flatten)]
    pub kind: AttributeKind,
    #[serde(default)]
    pub required: bool,
}

impl AttributeDefinition {
    fn new(kind: AttributeKind) -> Self {
        Self {
            kind,
            required: false,
        }
    }

    /// Relation to the given target collection
    pub fn relation(target: impl Into<String>) -> Self {
        Self::new(AttributeKind::Relation {
            target: Some(target.into()),
            relation: None,
        })
    }

    /// Relation with no configured target (polymorphic morph relations)
    pub fn untargeted_relation() -> Self {
        Self::new(AttributeKind::Relation {
            target: None,
            relation: Some("morphToMany".into()),
        })
    }

    /// Single media field
    pub fn media() -> Self {
        Self::new(AttributeKind::Media { multiple: false })
    }

    /// Multiple media field
    pub fn multiple_media() -> Self {
        Self::new(AttributeKind::Media { multiple: true })
    }

    /// Single component field
    pub fn component(uid: impl Into<String>) -> Self {
        Self::new(AttributeKind::Component {
            component: uid.into(),
            repeatable: false,
        })
    }

    /// Repeatable component field
    pub fn repeatable_component(uid: impl Into<String>) -> Self {
        Self::new(AttributeKind::Component {
            component: uid.into(),
            repeatable: true,
        })
    }

    /// Dynamic zone accepting the given components
    pub fn dynamic_zone<I, S>(components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(AttributeKind::DynamicZone {
            components: components.into_iter().map(Into::into).collect(),
        })
    }

    /// Plain scalar field
    pub fn scalar() -> Self {
        Self::new(AttributeKind::Scalar)
    }

    /// Marks the attribute as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// A content type or component schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSchema {
    /// Unique schema uid (`api::article.article`, `shared.seo`, ...)
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Attribute definitions, ordered by name
    pub attributes: BTreeMap<String, AttributeDefinition>,
}

impl ContentSchema {
    /// Create a new schema
    pub fn new(uid: impl Into<String>, attributes: BTreeMap<String, AttributeDefinition>) -> Self {
        Self {
            uid: uid.into(),
            description: None,
            attributes,
        }
    }

    /// Builder-style attribute insertion
    pub fn with_attribute(mut self, name: impl Into<String>, def: AttributeDefinition) -> Self {
        self.attributes.insert(name.into(), def);
        self
    }

    /// Validates the schema structure itself (not a payload)
    pub fn validate_structure(&self) -> Result<(), String> {
        if self.uid.trim().is_empty() {
            return Err("Schema must declare a non-empty 'uid'".into());
        }

        for (name, def) in &self.attributes {
            match &def.kind {
                AttributeKind::Component { component, .. } if component.trim().is_empty() => {
                    return Err(format!("Component attribute '{}' has an empty component uid", name));
                }
                AttributeKind::DynamicZone { components } => {
                    if components.iter().any(|c| c.trim().is_empty()) {
                        return Err(format!(
                            "Dynamic zone '{}' lists an empty component uid",
                            name
                        ));
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }
}
