use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

use serde_json::Value;

use catalog_core::InternalId;

use super::r#trait::{lookup, Document, DocumentStore, Filter, StoreError, StoredDocument};

#[derive(Debug, Default)]
struct Collection {
    docs: Vec<StoredDocument>,
    unique: BTreeSet<String>,
}

impl Collection {
    /// First unique field on which `doc` collides with a document other than `skip`.
    fn collision(&self, doc: &Document, skip: Option<InternalId>) -> Option<(String, Value)> {
        for field in &self.unique {
            let Some(value) = lookup(doc, field) else {
                continue;
            };
            let taken = self
                .docs
                .iter()
                .filter(|d| Some(d.id) != skip)
                .any(|d| lookup(&d.body, field) == Some(value));
            if taken {
                return Some((field.clone(), value.clone()));
            }
        }
        None
    }
}

fn duplicate(collection: &str, field: String, value: Value) -> StoreError {
    let value = match value {
        Value::String(s) => s,
        other => other.to_string(),
    };
    StoreError::DuplicateKey {
        collection: collection.to_string(),
        field,
        value,
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("lock poisoned".to_string())
}

/// In-memory document store.
///
/// Intended for tests/dev. Uniqueness checks and the insert happen under one
/// write lock, so concurrent inserts of the same key cannot both land.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn ensure_unique(&self, collection: &str, field: &str) -> Result<(), StoreError> {
        let mut collections = self.collections.write().map_err(|_| poisoned())?;
        collections
            .entry(collection.to_string())
            .or_default()
            .unique
            .insert(field.to_string());
        Ok(())
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let collections = self.collections.read().map_err(|_| poisoned())?;
        let count = collections
            .get(collection)
            .map(|c| c.docs.iter().filter(|d| filter.matches(&d.body)).count())
            .unwrap_or(0);
        Ok(count as u64)
    }

    async fn insert(&self, collection: &str, doc: Document) -> Result<InternalId, StoreError> {
        let mut collections = self.collections.write().map_err(|_| poisoned())?;
        let target = collections.entry(collection.to_string()).or_default();

        if let Some((field, value)) = target.collision(&doc, None) {
            return Err(duplicate(collection, field, value));
        }

        let id = InternalId::new();
        target.docs.push(StoredDocument::new(id, doc));
        Ok(id)
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<StoredDocument>, StoreError> {
        let collections = self.collections.read().map_err(|_| poisoned())?;
        Ok(collections
            .get(collection)
            .map(|c| {
                c.docs
                    .iter()
                    .filter(|d| filter.matches(&d.body))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: &Filter,
        set: Document,
    ) -> Result<Option<StoredDocument>, StoreError> {
        let mut collections = self.collections.write().map_err(|_| poisoned())?;
        let Some(target) = collections.get_mut(collection) else {
            return Ok(None);
        };
        let Some(idx) = target.docs.iter().position(|d| filter.matches(&d.body)) else {
            return Ok(None);
        };

        let mut updated = target.docs[idx].clone();
        for (field, value) in set {
            updated.body.insert(field, value);
        }
        if let Some((field, value)) = target.collision(&updated.body, Some(updated.id)) {
            return Err(duplicate(collection, field, value));
        }

        target.docs[idx] = updated.clone();
        Ok(Some(updated))
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let mut collections = self.collections.write().map_err(|_| poisoned())?;
        let Some(target) = collections.get_mut(collection) else {
            return Ok(0);
        };
        match target.docs.iter().position(|d| filter.matches(&d.body)) {
            Some(idx) => {
                target.docs.remove(idx);
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn unique_field_rejects_second_insert() {
        let store = InMemoryDocumentStore::new();
        store.ensure_unique("Category", "cid").await.unwrap();
        store.ensure_unique("Category", "cid").await.unwrap();

        store.insert("Category", doc(json!({ "cid": "C001" }))).await.unwrap();
        let err = store
            .insert("Category", doc(json!({ "cid": "C001" })))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            StoreError::DuplicateKey {
                collection: "Category".into(),
                field: "cid".into(),
                value: "C001".into(),
            }
        );
        assert_eq!(store.count("Category", &Filter::all()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn collections_are_independent() {
        let store = InMemoryDocumentStore::new();
        store.ensure_unique("Category", "cid").await.unwrap();
        store.insert("Category", doc(json!({ "cid": "C001" }))).await.unwrap();
        store.insert("Subcategory", doc(json!({ "cid": "C001" }))).await.unwrap();
        store.insert("Subcategory", doc(json!({ "cid": "C001" }))).await.unwrap();

        assert_eq!(store.count("Subcategory", &Filter::eq("cid", "C001")).await.unwrap(), 2);
        assert_eq!(store.count("Brand", &Filter::all()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn find_preserves_insertion_order() {
        let store = InMemoryDocumentStore::new();
        for key in ["V003", "V001", "V002"] {
            store.insert("Variant", doc(json!({ "vid": key }))).await.unwrap();
        }
        let keys: Vec<_> = store
            .find("Variant", &Filter::all())
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.body["vid"].clone())
            .collect();
        assert_eq!(keys, vec![json!("V003"), json!("V001"), json!("V002")]);
    }

    #[tokio::test]
    async fn update_sets_only_given_fields_and_returns_new_state() {
        let store = InMemoryDocumentStore::new();
        let id = store
            .insert("Brand", doc(json!({ "bid": "B001", "bname": "Acme", "bstatus": false })))
            .await
            .unwrap();

        let mut set = Document::new();
        set.insert("bstatus".into(), json!(true));
        let updated = store
            .find_one_and_update("Brand", &Filter::eq("bid", "B001"), set)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.id, id);
        assert_eq!(updated.body, doc(json!({ "bid": "B001", "bname": "Acme", "bstatus": true })));
    }

    #[tokio::test]
    async fn update_and_delete_without_match_are_not_errors() {
        let store = InMemoryDocumentStore::new();
        let missing = Filter::eq("pid", "P404");
        assert!(store
            .find_one_and_update("Product", &missing, Document::new())
            .await
            .unwrap()
            .is_none());
        assert_eq!(store.delete_one("Product", &missing).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn delete_removes_at_most_one() {
        let store = InMemoryDocumentStore::new();
        store.insert("Variant", doc(json!({ "vid": "V001" }))).await.unwrap();
        store.insert("Variant", doc(json!({ "vid": "V001" }))).await.unwrap();

        assert_eq!(store.delete_one("Variant", &Filter::eq("vid", "V001")).await.unwrap(), 1);
        assert_eq!(store.count("Variant", &Filter::all()).await.unwrap(), 1);
    }
}
