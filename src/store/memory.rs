use crate::document::{Document, FieldValue, Reference};
use crate::error::{GuardError, GuardResult};
use crate::store::DocumentStore;
use async_trait::async_trait;
use log::debug;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

type SaveValidator = dyn Fn(&Document) -> Result<(), String> + Send + Sync;

/// In-process [`DocumentStore`] keyed by schema name and document id.
///
/// Documents get a v4 UUID on their first save. References are stored as
/// ids, the way a database would store them, so a later `resolve` hands
/// back an unpopulated copy.
#[derive(Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<String, HashMap<String, Document>>>,
    validator: Option<Arc<SaveValidator>>,
    save_calls: AtomicUsize,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose saves are rejected with [`GuardError::Storage`] whenever
    /// `validator` returns an error.
    #[must_use]
    pub fn with_validator<F>(validator: F) -> Self
    where
        F: Fn(&Document) -> Result<(), String> + Send + Sync + 'static,
    {
        Self {
            validator: Some(Arc::new(validator)),
            ..Self::default()
        }
    }

    /// Number of times `save` has been called, failed calls included.
    #[must_use]
    pub fn save_calls(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    pub async fn get(&self, schema: &str, id: &str) -> Option<Document> {
        self.documents
            .read()
            .await
            .get(schema)
            .and_then(|documents| documents.get(id))
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.values().map(HashMap::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore")
            .field("has_validator", &self.validator.is_some())
            .field("save_calls", &self.save_calls())
            .finish_non_exhaustive()
    }
}

fn depopulated(document: &Document) -> Document {
    let mut stored = document.clone();
    let populated: Vec<String> = stored
        .values()
        .filter(|(_, value)| value.is_populated())
        .map(|(field, _)| field.to_string())
        .collect();

    for field in populated {
        let collapsed = match stored.remove(&field) {
            Some(FieldValue::Reference(reference)) => FieldValue::Reference(reference.depopulate()),
            Some(FieldValue::References(references)) => FieldValue::References(
                references.into_iter().map(Reference::depopulate).collect(),
            ),
            Some(other) => other,
            None => continue,
        };
        stored.insert_validated(field, collapsed);
    }
    stored
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn save(&self, mut document: Document) -> GuardResult<Document> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(validator) = &self.validator {
            validator(&document).map_err(GuardError::Storage)?;
        }

        let id = match document.id() {
            Some(id) => id.to_string(),
            None => {
                let id = Uuid::new_v4().to_string();
                document.set_id(id.clone());
                id
            }
        };

        let schema = document.schema().name().to_string();
        debug!("Saving {} document {}", schema, id);
        self.documents
            .write()
            .await
            .entry(schema)
            .or_default()
            .insert(id, depopulated(&document));

        Ok(document)
    }

    async fn resolve(&self, target: &str, id: &str) -> GuardResult<Option<Document>> {
        Ok(self.get(target, id).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ref_schema, test_schema};
    use serde_json::json;

    #[tokio::test]
    async fn test_save_assigns_id_once() {
        let store = MemoryStore::new();
        let saved = store.save(Document::new(test_schema())).await.unwrap();
        let id = saved.id().unwrap().to_string();

        let saved_again = store.save(saved).await.unwrap();
        assert_eq!(saved_again.id(), Some(id.as_str()));
        assert_eq!(store.len().await, 1);
        assert_eq!(store.save_calls(), 2);
    }

    #[tokio::test]
    async fn test_validator_rejects_save() {
        let store = MemoryStore::with_validator(|doc| {
            if doc.get_scalar("truthy") == Some(&json!("bad")) {
                Err("truthy may not be bad".to_string())
            } else {
                Ok(())
            }
        });
        let mut doc = Document::new(test_schema());
        doc.set("truthy", "bad").unwrap();

        let err = store.save(doc).await.unwrap_err();
        assert!(matches!(err, GuardError::Storage(_)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_populate_and_store_as_ids() {
        let store = MemoryStore::new();
        let target = store
            .save(Document::from_json(test_schema(), json!({"truthy": "t"})).unwrap())
            .await
            .unwrap();
        let target_id = target.id().unwrap().to_string();

        let mut doc = Document::new(ref_schema());
        doc.set("truthy", Reference::id(target_id.clone())).unwrap();
        doc.set("falsy", Reference::id("missing")).unwrap();

        store.populate(&mut doc, "truthy").await.unwrap();
        store.populate(&mut doc, "falsy").await.unwrap();
        assert!(doc.is_populated("truthy"));
        assert!(!doc.is_populated("falsy"));

        let saved = store.save(doc).await.unwrap();
        assert!(saved.is_populated("truthy"));

        let stored = store.get("Ref", saved.id().unwrap()).await.unwrap();
        assert!(!stored.is_populated("truthy"));
        match stored.get("truthy") {
            Some(FieldValue::Reference(reference)) => {
                assert_eq!(reference.target_id(), Some(target_id.as_str()))
            }
            other => panic!("unexpected value: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_populate_rejects_non_reference_field() {
        let store = MemoryStore::new();
        let mut doc = Document::new(test_schema());
        let err = store.populate(&mut doc, "truthy").await.unwrap_err();
        assert!(matches!(err, GuardError::Config(_)));
    }
}
