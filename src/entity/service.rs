//! Entity write service
//!
//! Every create and update runs relation validation before the store is
//! touched. A rejected validation leaves storage unchanged.

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use tracing::{info, info_span, warn, Instrument};

use super::context::WriteContext;
use super::errors::{EntityError, EntityResult};
use super::operation::WriteOp;
use crate::relations::{CollectOptions, RelationValidator};
use crate::schema::SchemaLookup;
use crate::store::{EntityStore, StorageQuery};

const CREATED_AT: &str = "createdAt";
const UPDATED_AT: &str = "updatedAt";

/// Creates and updates entities of registered content types
pub struct EntityService<L, S> {
    schemas: Arc<L>,
    store: Arc<S>,
    options: CollectOptions,
}

impl<L, S> EntityService<L, S>
where
    L: SchemaLookup,
    S: StorageQuery + EntityStore,
{
    pub fn new(schemas: Arc<L>, store: Arc<S>, options: CollectOptions) -> Self {
        Self {
            schemas,
            store,
            options,
        }
    }

    /// Shared store handle
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Dispatch a write operation
    pub async fn execute(&self, ctx: &WriteContext, op: WriteOp) -> EntityResult<Value> {
        match op {
            WriteOp::Create(c) => self.create(ctx, &c.uid, c.data).await,
            WriteOp::Update(u) => self.update(ctx, &u.uid, u.id, u.data).await,
        }
    }

    /// Validate and insert a new entity
    pub async fn create(&self, ctx: &WriteContext, uid: &str, data: Value) -> EntityResult<Value> {
        let span = info_span!("entity_write", request_id = %ctx.request_id, uid, op = "create");
        async move {
            let mut fields = self.prepare(uid, data)?;
            self.validate(uid, &fields).await?;

            let now = timestamp();
            fields.insert(CREATED_AT.into(), Value::String(now.clone()));
            fields.insert(UPDATED_AT.into(), Value::String(now));

            let created = self.store.insert(uid, fields).await?;
            let id = created["id"].as_u64().unwrap_or_default();
            info!(id, elapsed_ms = ctx.elapsed_ms() as u64, "entity created");
            Ok(created)
        }
        .instrument(span)
        .await
    }

    /// Validate and apply an update to an existing entity
    pub async fn update(
        &self,
        ctx: &WriteContext,
        uid: &str,
        id: u64,
        data: Value,
    ) -> EntityResult<Value> {
        let span = info_span!("entity_write", request_id = %ctx.request_id, uid, id, op = "update");
        async move {
            let mut fields = self.prepare(uid, data)?;
            self.validate(uid, &fields).await?;

            fields.remove(CREATED_AT);
            fields.insert(UPDATED_AT.into(), Value::String(timestamp()));

            let updated = self
                .store
                .update(uid, id, fields)
                .await?
                .ok_or_else(|| EntityError::NotFound {
                    uid: uid.to_string(),
                    id,
                })?;
            info!(elapsed_ms = ctx.elapsed_ms() as u64, "entity updated");
            Ok(updated)
        }
        .instrument(span)
        .await
    }

    fn prepare(&self, uid: &str, data: Value) -> EntityResult<Map<String, Value>> {
        if self.schemas.lookup(uid).is_none() {
            return Err(EntityError::UnknownContentType(uid.to_string()));
        }
        match data {
            Value::Object(fields) => Ok(fields),
            other => Err(EntityError::InvalidPayload(format!(
                "expected an object, got {}",
                other
            ))),
        }
    }

    async fn validate(&self, uid: &str, fields: &Map<String, Value>) -> EntityResult<()> {
        // Validation reads the payload as a whole JSON value
        let payload = Value::Object(fields.clone());
        let validator = RelationValidator::new(self.schemas.as_ref(), self.store.as_ref(), &self.options);

        validator.validate(&payload, uid).await.map_err(|e| {
            warn!(code = e.code(), error = %e, "write rejected");
            EntityError::from(e)
        })
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::operation::CreateOp;
    use crate::relations::MEDIA_COLLECTION_UID;
    use crate::schema::{AttributeDefinition, ContentSchema, SchemaRegistry};
    use crate::store::MemoryStore;
    use serde_json::json;
    use std::collections::BTreeMap;

    const ARTICLE: &str = "api::article.article";
    const USERS: &str = "api::user.user";

    fn service(store: MemoryStore) -> EntityService<SchemaRegistry, MemoryStore> {
        let registry = SchemaRegistry::from_schemas([ContentSchema::new(ARTICLE, BTreeMap::new())
            .with_attribute("title", AttributeDefinition::scalar())
            .with_attribute("author", AttributeDefinition::relation(USERS))
            .with_attribute("cover", AttributeDefinition::media())])
        .unwrap();
        EntityService::new(Arc::new(registry), Arc::new(store), CollectOptions::default())
    }

    #[tokio::test]
    async fn test_create_with_valid_references() {
        let svc = service(
            MemoryStore::new()
                .with_ids(USERS, [5])
                .with_ids(MEDIA_COLLECTION_UID, [9]),
        );
        let ctx = WriteContext::new();

        let created = svc
            .create(&ctx, ARTICLE, json!({ "title": "Hi", "author": [5], "cover": 9 }))
            .await
            .unwrap();

        assert_eq!(created["id"], json!(1));
        assert_eq!(created["title"], json!("Hi"));
        assert!(created[CREATED_AT].is_string());
        assert_eq!(created[CREATED_AT], created[UPDATED_AT]);
    }

    #[tokio::test]
    async fn test_create_rejected_leaves_store_untouched() {
        let svc = service(MemoryStore::new());
        let ctx = WriteContext::new();

        let err = svc
            .create(&ctx, ARTICLE, json!({ "author": { "connect": [5] } }))
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), 400);
        assert!(err.to_string().contains(USERS));
        assert_eq!(svc.store().count(ARTICLE).unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_validates_and_merges() {
        let store = MemoryStore::new().with_ids(USERS, [2]);
        store
            .put_record(ARTICLE, json!({ "id": 7, "title": "Old", "createdAt": "2024-01-01T00:00:00.000Z" }))
            .unwrap();
        let svc = service(store);
        let ctx = WriteContext::new();

        let updated = svc
            .update(&ctx, ARTICLE, 7, json!({ "title": "New", "author": [2], "createdAt": "x" }))
            .await
            .unwrap();
        assert_eq!(updated["title"], json!("New"));
        assert_eq!(updated[CREATED_AT], json!("2024-01-01T00:00:00.000Z"));

        let err = svc
            .update(&ctx, ARTICLE, 7, json!({ "author": [3] }))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "AERO_CMS_RELATION_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_update_missing_entity() {
        let svc = service(MemoryStore::new());
        let err = svc
            .update(&WriteContext::new(), ARTICLE, 42, json!({ "title": "x" }))
            .await
            .unwrap_err();
        assert!(matches!(err, EntityError::NotFound { id: 42, .. }));
    }

    #[tokio::test]
    async fn test_unknown_content_type_and_bad_payload() {
        let svc = service(MemoryStore::new());
        let ctx = WriteContext::new();

        let err = svc.create(&ctx, "api::nope.nope", json!({})).await.unwrap_err();
        assert_eq!(err.status_code(), 404);

        let err = svc.create(&ctx, ARTICLE, json!([1, 2])).await.unwrap_err();
        assert_eq!(err.code(), "AERO_CMS_INVALID_PAYLOAD");
    }

    #[tokio::test]
    async fn test_execute_dispatches() {
        let svc = service(MemoryStore::new());
        let op = WriteOp::Create(CreateOp {
            uid: ARTICLE.into(),
            data: json!({ "title": "Dispatched", "author": 0 }),
        });
        let created = svc.execute(&WriteContext::new(), op).await.unwrap();
        assert_eq!(created["author"], json!(0));
    }
}
