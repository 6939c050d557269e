//! Reference collection
//!
//! Walks a write payload against its schema and buckets every referenced id
//! by target collection:
//! - relation: `connect`, `set` and direct ids go to the relation's target
//! - media: every file id goes to the media collection
//! - component: each instance is walked with the component's schema
//! - dynamiczone: each item is walked with the schema named by `__component`
//!
//! Traversal follows the payload, not the schema graph, so every component
//! occurrence is visited once and recursive schemas terminate.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::errors::{RelationError, RelationResult};
use super::input::{is_falsy, MediaInput, RelationInput};
use super::reference::ReferenceBuckets;
use crate::schema::{AttributeKind, SchemaLookup};

/// Collection uid of the upload store shared by every media attribute
pub const MEDIA_COLLECTION_UID: &str = "plugin::upload.file";

/// Key naming the component type of a dynamic-zone item
pub const COMPONENT_TYPE_KEY: &str = "__component";

/// What to do with payload shapes the collector cannot read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Fail the validation with `MalformedPayload`
    #[default]
    Reject,
    /// Log and skip the offending value
    Ignore,
}

/// Collector settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectOptions {
    pub media_collection: String,
    pub malformed: MalformedPolicy,
    /// Also check relation values given as one bare id (`5`, `{ "id": 5 }`).
    /// Off by default: such values reference nothing.
    pub single_relation_ids: bool,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            media_collection: MEDIA_COLLECTION_UID.to_string(),
            malformed: MalformedPolicy::Reject,
            single_relation_ids: false,
        }
    }
}

/// Walks payloads against schemas resolved through a [`SchemaLookup`].
pub struct ReferenceCollector<'a, L: SchemaLookup + ?Sized> {
    lookup: &'a L,
    options: &'a CollectOptions,
}

impl<'a, L: SchemaLookup + ?Sized> ReferenceCollector<'a, L> {
    pub fn new(lookup: &'a L, options: &'a CollectOptions) -> Self {
        Self { lookup, options }
    }

    /// Collects every reference made by `payload`, written as schema `uid`.
    pub fn collect(&self, payload: &Value, uid: &str) -> RelationResult<ReferenceBuckets> {
        let mut buckets = ReferenceBuckets::new();
        self.walk(payload, uid, "", &mut buckets)?;
        Ok(buckets)
    }

    fn walk(
        &self,
        data: &Value,
        uid: &str,
        path: &str,
        buckets: &mut ReferenceBuckets,
    ) -> RelationResult<()> {
        let Some(schema) = self.lookup.lookup(uid) else {
            debug!(uid, path, "schema not found, nothing to collect");
            return Ok(());
        };

        let Some(fields) = data.as_object() else {
            return self.malformed(
                display_path(path),
                format!("expected an object for '{}', got {}", uid, data),
            );
        };

        for (name, def) in &schema.attributes {
            let Some(value) = fields.get(name) else {
                continue;
            };
            if is_falsy(value) {
                continue;
            }
            let field_path = make_path(path, name);

            match &def.kind {
                AttributeKind::Relation { target: None, .. } => {}
                AttributeKind::Relation {
                    target: Some(target),
                    ..
                } => match RelationInput::parse(value) {
                    Ok(RelationInput::Single(_)) if !self.options.single_relation_ids => {
                        debug!(path = %field_path, "single relation id not checked");
                    }
                    Ok(input) => buckets.extend(target, input.into_ids()),
                    Err(reason) => self.malformed(&field_path, reason)?,
                },
                AttributeKind::Media { .. } => match MediaInput::parse(value) {
                    Ok(input) => buckets.extend(&self.options.media_collection, input.into_ids()),
                    Err(reason) => self.malformed(&field_path, reason)?,
                },
                AttributeKind::Component { component, .. } => match value {
                    Value::Array(items) => {
                        for (i, item) in items.iter().enumerate() {
                            let item_path = format!("{}[{}]", field_path, i);
                            self.walk(item, component, &item_path, buckets)?;
                        }
                    }
                    single => self.walk(single, component, &field_path, buckets)?,
                },
                AttributeKind::DynamicZone { .. } => {
                    let Some(items) = value.as_array() else {
                        self.malformed(&field_path, "dynamic zone value must be an array")?;
                        continue;
                    };
                    for (i, item) in items.iter().enumerate() {
                        let item_path = format!("{}[{}]", field_path, i);
                        match item.get(COMPONENT_TYPE_KEY).and_then(Value::as_str) {
                            Some(component) => self.walk(item, component, &item_path, buckets)?,
                            None => self.malformed(
                                &item_path,
                                format!("dynamic zone item has no '{}'", COMPONENT_TYPE_KEY),
                            )?,
                        }
                    }
                }
                AttributeKind::Scalar => {}
            }
        }

        Ok(())
    }

    fn malformed(&self, path: &str, reason: impl Into<String>) -> RelationResult<()> {
        let reason = reason.into();
        match self.options.malformed {
            MalformedPolicy::Reject => Err(RelationError::MalformedPayload {
                path: path.to_string(),
                reason,
            }),
            MalformedPolicy::Ignore => {
                warn!(path, %reason, "ignoring malformed payload value");
                Ok(())
            }
        }
    }
}

fn make_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "$root"
    } else {
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relations::reference::ReferenceId;
    use crate::schema::{AttributeDefinition, ContentSchema, SchemaRegistry};
    use serde_json::json;
    use std::collections::BTreeMap;

    const USERS: &str = "api::user.user";
    const TAGS: &str = "api::tag.tag";

    fn registry() -> SchemaRegistry {
        SchemaRegistry::from_schemas([
            ContentSchema::new("api::article.article", BTreeMap::new())
                .with_attribute("title", AttributeDefinition::scalar())
                .with_attribute("author", AttributeDefinition::relation(USERS))
                .with_attribute("tags", AttributeDefinition::relation(TAGS))
                .with_attribute("related", AttributeDefinition::untargeted_relation())
                .with_attribute("cover", AttributeDefinition::media())
                .with_attribute("seo", AttributeDefinition::component("shared.seo"))
                .with_attribute("links", AttributeDefinition::repeatable_component("shared.link"))
                .with_attribute(
                    "blocks",
                    AttributeDefinition::dynamic_zone(["blocks.quote", "blocks.gallery"]),
                ),
            ContentSchema::new("shared.seo", BTreeMap::new())
                .with_attribute("image", AttributeDefinition::media())
                .with_attribute("nested", AttributeDefinition::component("shared.link")),
            ContentSchema::new("shared.link", BTreeMap::new())
                .with_attribute("page", AttributeDefinition::relation("api::page.page")),
            ContentSchema::new("blocks.quote", BTreeMap::new())
                .with_attribute("quoted", AttributeDefinition::relation(USERS)),
            ContentSchema::new("blocks.gallery", BTreeMap::new())
                .with_attribute("images", AttributeDefinition::multiple_media()),
        ])
        .unwrap()
    }

    fn collect(payload: Value) -> RelationResult<ReferenceBuckets> {
        let registry = registry();
        let options = CollectOptions::default();
        ReferenceCollector::new(&registry, &options).collect(&payload, "api::article.article")
    }

    fn refs(raw: &[u64]) -> Vec<ReferenceId> {
        raw.iter().copied().map(ReferenceId::from).collect()
    }

    fn ids(buckets: &ReferenceBuckets, collection: &str) -> Vec<ReferenceId> {
        buckets
            .get(collection)
            .map(|b| b.ids().to_vec())
            .unwrap_or_default()
    }

    #[test]
    fn test_relation_shapes_concatenate() {
        let buckets = collect(json!({
            "author": { "connect": [{ "id": 5 }], "set": [6] },
            "tags": [1, 2, 1]
        }))
        .unwrap();

        assert_eq!(ids(&buckets, USERS), refs(&[5, 6]));
        assert_eq!(ids(&buckets, TAGS), refs(&[1, 2, 1]));
    }

    #[test]
    fn test_untargeted_relation_is_skipped() {
        let buckets = collect(json!({ "related": [{ "id": 3, "__type": "api::x.x" }] })).unwrap();
        assert!(buckets.is_empty());
    }

    #[test]
    fn test_single_relation_id_is_not_collected() {
        let buckets = collect(json!({ "author": 5, "tags": { "id": 2 } })).unwrap();
        assert!(buckets.is_empty());
    }

    #[test]
    fn test_single_relation_id_opt_in() {
        let registry = registry();
        let options = CollectOptions {
            single_relation_ids: true,
            ..CollectOptions::default()
        };
        let buckets = ReferenceCollector::new(&registry, &options)
            .collect(&json!({ "author": "5", "tags": { "id": 2 } }), "api::article.article")
            .unwrap();
        assert_eq!(ids(&buckets, USERS), refs(&[5]));
        assert_eq!(ids(&buckets, TAGS), refs(&[2]));
    }

    #[test]
    fn test_media_goes_to_upload_bucket() {
        let buckets = collect(json!({ "cover": { "id": 9 } })).unwrap();
        assert_eq!(ids(&buckets, MEDIA_COLLECTION_UID), refs(&[9]));
    }

    #[test]
    fn test_falsy_values_are_skipped() {
        let buckets = collect(json!({
            "author": 0,
            "tags": [],
            "cover": null,
            "seo": "",
            "blocks": false
        }))
        .unwrap();
        assert!(buckets.is_empty());
    }

    #[test]
    fn test_nested_components_use_their_own_schema() {
        let buckets = collect(json!({
            "seo": {
                "image": 4,
                "nested": { "page": { "connect": [12] } }
            },
            "links": [{ "page": [10] }, { "page": [11] }]
        }))
        .unwrap();

        assert_eq!(ids(&buckets, MEDIA_COLLECTION_UID), refs(&[4]));
        assert_eq!(
            ids(&buckets, "api::page.page"),
            refs(&[10, 11, 12])
        );
        assert!(buckets.get(USERS).is_none());
    }

    #[test]
    fn test_dynamic_zone_items_use_declared_component() {
        let buckets = collect(json!({
            "blocks": [
                { "__component": "blocks.quote", "quoted": [7] },
                { "__component": "blocks.gallery", "images": [{ "id": 1 }, { "id": 2 }] },
                { "__component": "blocks.quote", "quoted": [8] }
            ]
        }))
        .unwrap();

        assert_eq!(ids(&buckets, USERS), refs(&[7, 8]));
        assert_eq!(ids(&buckets, MEDIA_COLLECTION_UID), refs(&[1, 2]));
    }

    #[test]
    fn test_unknown_component_schema_contributes_nothing() {
        let buckets = collect(json!({
            "blocks": [{ "__component": "blocks.unknown", "quoted": [7] }]
        }))
        .unwrap();
        assert!(buckets.is_empty());
    }

    #[test]
    fn test_unknown_root_schema_contributes_nothing() {
        let registry = registry();
        let options = CollectOptions::default();
        let buckets = ReferenceCollector::new(&registry, &options)
            .collect(&json!({ "author": [1] }), "api::missing.missing")
            .unwrap();
        assert!(buckets.is_empty());
    }

    #[test]
    fn test_dynamic_zone_item_without_component_is_rejected() {
        let err = collect(json!({ "blocks": [{ "quoted": [7] }] })).unwrap_err();
        match err {
            RelationError::MalformedPayload { path, reason } => {
                assert_eq!(path, "blocks[0]");
                assert!(reason.contains("__component"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_array_dynamic_zone_is_rejected() {
        let err = collect(json!({ "blocks": { "__component": "blocks.quote" } })).unwrap_err();
        assert_eq!(err.code(), "AERO_CMS_MALFORMED_PAYLOAD");
    }

    #[test]
    fn test_ignore_policy_skips_malformed_values() {
        let registry = registry();
        let options = CollectOptions {
            malformed: MalformedPolicy::Ignore,
            ..CollectOptions::default()
        };
        let payload = json!({
            "author": { "connect": "5" },
            "tags": [3],
            "blocks": [{ "quoted": [7] }, { "__component": "blocks.quote", "quoted": [8] }]
        });

        let buckets = ReferenceCollector::new(&registry, &options)
            .collect(&payload, "api::article.article")
            .unwrap();
        assert_eq!(ids(&buckets, TAGS), refs(&[3]));
        assert_eq!(ids(&buckets, USERS), refs(&[8]));
    }

    #[test]
    fn test_custom_media_collection() {
        let registry = registry();
        let options = CollectOptions {
            media_collection: "plugin::assets.asset".into(),
            ..CollectOptions::default()
        };
        let buckets = ReferenceCollector::new(&registry, &options)
            .collect(&json!({ "cover": 3 }), "api::article.article")
            .unwrap();
        assert_eq!(ids(&buckets, "plugin::assets.asset"), refs(&[3]));
    }
}
