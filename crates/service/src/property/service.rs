use std::sync::Arc;

use models::{errors::ModelError, property, Document, Property};
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::storage::DocumentStore;

/// Application service for property listings.
///
/// Every operation loads the full document from the store. Mutations hold
/// `write_lock` across load, change and save so concurrent requests cannot
/// overwrite each other's changes.
pub struct PropertyService {
    store: Arc<dyn DocumentStore>,
    write_lock: Mutex<()>,
}

impl PropertyService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store, write_lock: Mutex::new(()) }
    }

    pub async fn list(&self) -> Result<Vec<Property>, ServiceError> {
        let _guard = self.write_lock.lock().await;
        Ok(self.store.load().await?.properties)
    }

    pub async fn get(&self, id: &str) -> Result<Property, ServiceError> {
        let _guard = self.write_lock.lock().await;
        let document = self.store.load().await?;
        document.find(id).cloned().ok_or_else(|| ServiceError::not_found("property"))
    }

    /// Validate, assign a fresh id, append and persist.
    #[instrument(skip(self, candidate))]
    pub async fn create(&self, candidate: Value) -> Result<Property, ServiceError> {
        property::validate(&candidate)?;
        let fields = into_object(candidate)?;

        let created = self
            .update_document(|document| {
                let mut id = Uuid::new_v4().to_string();
                while document.find(&id).is_some() {
                    id = Uuid::new_v4().to_string();
                }
                let record = Property::from_candidate(id, fields)?;
                document.properties.push(record.clone());
                Ok(record)
            })
            .await?;
        info!(id = %created.id, title = %created.title, "created property");
        Ok(created)
    }

    /// Shallow-merge `candidate` over the stored record. Omitted fields keep
    /// their value; `id` always stays the path id; the merged record must
    /// pass validation.
    #[instrument(skip(self, candidate))]
    pub async fn update(&self, id: &str, candidate: Value) -> Result<Property, ServiceError> {
        let patch = into_object(candidate)?;

        let updated = self
            .update_document(|document| {
                let idx = document.position(id).ok_or_else(|| ServiceError::not_found("property"))?;
                let merged = document.properties[idx].merge(patch)?;
                document.properties[idx] = merged.clone();
                Ok(merged)
            })
            .await?;
        info!(id = %updated.id, "updated property");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        self.update_document(|document| {
            let before = document.properties.len();
            document.properties.retain(|p| p.id != id);
            if document.properties.len() == before {
                return Err(ServiceError::not_found("property"));
            }
            Ok(())
        })
        .await?;
        info!(%id, "deleted property");
        Ok(())
    }

    /// Load, apply `f`, and persist only if `f` succeeded.
    async fn update_document<F, T>(&self, f: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&mut Document) -> Result<T, ServiceError>,
    {
        let _guard = self.write_lock.lock().await;
        let mut document = self.store.load().await?;
        let out = f(&mut document)?;
        self.store.save(&document).await?;
        Ok(out)
    }
}

fn into_object(candidate: Value) -> Result<Map<String, Value>, ModelError> {
    match candidate {
        Value::Object(map) => Ok(map),
        _ => Err(ModelError::Validation("property must be a JSON object".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{JsonFileStore, MemoryStore};
    use serde_json::json;

    fn listing() -> Value {
        json!({
            "title": "A",
            "address": "X",
            "bedrooms": 2,
            "bathrooms": 1,
            "suites": 0,
            "built_area": 50,
            "total_area": 60,
            "price": 100000,
            "condition": "new",
            "description": "d",
            "cover_image_url": "u",
            "photos_google_drive_link": "l"
        })
    }

    fn memory_service() -> (Arc<MemoryStore>, PropertyService) {
        let store = Arc::new(MemoryStore::new());
        let svc = PropertyService::new(store.clone());
        (store, svc)
    }

    #[tokio::test]
    async fn create_then_list_returns_the_record() -> Result<(), anyhow::Error> {
        let (_, svc) = memory_service();
        let created = svc.create(listing()).await?;
        assert!(!created.id.is_empty());
        assert_eq!(created.suites, serde_json::Number::from(0));

        let all = svc.list().await?;
        assert_eq!(all, vec![created.clone()]);
        assert_eq!(svc.get(&created.id).await?, created);
        Ok(())
    }

    #[tokio::test]
    async fn created_ids_are_unique_and_caller_id_is_ignored() -> Result<(), anyhow::Error> {
        let (_, svc) = memory_service();
        let mut payload = listing();
        payload["id"] = json!("mine");
        let a = svc.create(payload.clone()).await?;
        let b = svc.create(payload).await?;
        assert_ne!(a.id, "mine");
        assert_ne!(a.id, b.id);
        Ok(())
    }

    #[tokio::test]
    async fn extra_fields_are_kept() -> Result<(), anyhow::Error> {
        let (_, svc) = memory_service();
        let mut payload = listing();
        payload["neighborhood"] = json!("Centro");
        let created = svc.create(payload).await?;
        let listed = svc.list().await?;
        assert_eq!(listed[0].extra.get("neighborhood"), Some(&json!("Centro")));
        assert_eq!(created.extra.get("neighborhood"), Some(&json!("Centro")));
        Ok(())
    }

    #[tokio::test]
    async fn create_missing_price_is_rejected_without_writing() -> Result<(), anyhow::Error> {
        let (_, svc) = memory_service();
        let mut payload = listing();
        payload.as_object_mut().unwrap().remove("price");

        let err = svc.create(payload).await.unwrap_err();
        assert!(matches!(err, ServiceError::Model(_)));
        assert!(err.to_string().contains("price"));
        assert!(svc.list().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn update_merges_and_pins_id() -> Result<(), anyhow::Error> {
        let (_, svc) = memory_service();
        let created = svc.create(listing()).await?;

        let updated = svc
            .update(&created.id, json!({"id": "hijack", "price": 95000, "pool": true}))
            .await?;
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.price, serde_json::Number::from(95000));
        assert_eq!(updated.title, "A");
        assert_eq!(updated.extra.get("pool"), Some(&json!(true)));

        assert_eq!(svc.list().await?, vec![updated]);
        Ok(())
    }

    #[tokio::test]
    async fn update_with_full_payload_replaces_fields() -> Result<(), anyhow::Error> {
        let (_, svc) = memory_service();
        let created = svc.create(listing()).await?;
        let mut payload = listing();
        payload["title"] = json!("B");
        payload["suites"] = json!(1);

        let updated = svc.update(&created.id, payload).await?;
        assert_eq!(updated.title, "B");
        assert_eq!(updated.suites, serde_json::Number::from(1));
        Ok(())
    }

    #[tokio::test]
    async fn update_rejects_invalid_merge_and_keeps_record() -> Result<(), anyhow::Error> {
        let (_, svc) = memory_service();
        let created = svc.create(listing()).await?;

        let err = svc.update(&created.id, json!({"price": "cheap"})).await.unwrap_err();
        assert!(matches!(err, ServiceError::Model(_)));
        assert_eq!(svc.get(&created.id).await?, created);

        let err = svc.update(&created.id, json!(["not", "an", "object"])).await.unwrap_err();
        assert!(matches!(err, ServiceError::Model(ModelError::Validation(_))));
        Ok(())
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found() {
        let (_, svc) = memory_service();
        let err = svc.update("missing", listing()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_removes_exactly_one() -> Result<(), anyhow::Error> {
        let (_, svc) = memory_service();
        let a = svc.create(listing()).await?;
        let b = svc.create(listing()).await?;

        assert!(matches!(svc.delete("nope").await, Err(ServiceError::NotFound(_))));
        assert_eq!(svc.list().await?.len(), 2);

        svc.delete(&a.id).await?;
        let rest = svc.list().await?;
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].id, b.id);

        assert!(matches!(svc.delete(&a.id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(svc.get(&a.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn failed_save_leaves_collection_unchanged() -> Result<(), anyhow::Error> {
        let (store, svc) = memory_service();
        let kept = svc.create(listing()).await?;

        store.set_simulate_write_error(true);
        assert!(matches!(svc.create(listing()).await, Err(ServiceError::Io(_))));
        assert!(matches!(svc.delete(&kept.id).await, Err(ServiceError::Io(_))));
        store.set_simulate_write_error(false);

        assert_eq!(svc.list().await?, vec![kept]);
        Ok(())
    }

    #[tokio::test]
    async fn list_preserves_insertion_order() -> Result<(), anyhow::Error> {
        let (_, svc) = memory_service();
        let mut ids = Vec::new();
        for title in ["first", "second", "third"] {
            let mut payload = listing();
            payload["title"] = json!(title);
            ids.push(svc.create(payload).await?.id);
        }
        let listed: Vec<String> = svc.list().await?.into_iter().map(|p| p.id).collect();
        assert_eq!(listed, ids);
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_creates_on_file_store_lose_nothing() -> Result<(), anyhow::Error> {
        let dir = std::env::temp_dir().join(format!("property_service_{}", Uuid::new_v4()));
        let store = Arc::new(JsonFileStore::new(dir.join("properties.json")));
        let svc = Arc::new(PropertyService::new(store.clone()));

        let mut handles = Vec::new();
        for i in 0..20 {
            let svc = Arc::clone(&svc);
            handles.push(tokio::spawn(async move {
                let mut payload = listing();
                payload["title"] = json!(format!("listing {i}"));
                svc.create(payload).await
            }));
        }
        for h in handles {
            h.await??;
        }

        let reloaded = PropertyService::new(Arc::new(JsonFileStore::new(dir.join("properties.json"))));
        assert_eq!(reloaded.list().await?.len(), 20);

        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }
}
