//! Typed access to one entity kind's collection.

use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value;

use catalog_core::{BusinessKey, CatalogEntity, EntityUpdate, InternalId, StatusUpdate};

use crate::store::{Document, DocumentStore, Filter, StoreError, StoredDocument};

/// Collection-scoped view of a [`DocumentStore`] for entity `E`.
///
/// Every lookup goes through the entity's business key field; callers never
/// build filters by hand.
pub struct Repository<E> {
    store: Arc<dyn DocumentStore>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: CatalogEntity> Repository<E> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    pub fn collection(&self) -> &'static str {
        E::KIND.collection()
    }

    pub fn by_key(key: &BusinessKey) -> Filter {
        Filter::eq(E::KIND.key_field(), key.as_str())
    }

    pub async fn insert(&self, entity: &E) -> Result<InternalId, StoreError> {
        let doc = self.encode(entity)?;
        self.store.insert(self.collection(), doc).await
    }

    /// First document carrying `key`.
    pub async fn get(&self, key: &BusinessKey) -> Result<Option<StoredDocument>, StoreError> {
        let mut found = self.store.find(self.collection(), &Self::by_key(key)).await?;
        Ok(if found.is_empty() {
            None
        } else {
            Some(found.swap_remove(0))
        })
    }

    pub async fn list(&self) -> Result<Vec<StoredDocument>, StoreError> {
        self.store.find(self.collection(), &Filter::all()).await
    }

    pub async fn update(&self, update: &E::Update) -> Result<Option<StoredDocument>, StoreError> {
        self.store
            .find_one_and_update(self.collection(), &Self::by_key(update.key()), update.assignments())
            .await
    }

    pub async fn update_status(&self, update: &StatusUpdate) -> Result<Option<StoredDocument>, StoreError> {
        self.store
            .find_one_and_update(
                self.collection(),
                &Self::by_key(&update.key),
                update.assignment(E::KIND),
            )
            .await
    }

    pub async fn delete(&self, key: &BusinessKey) -> Result<u64, StoreError> {
        self.store.delete_one(self.collection(), &Self::by_key(key)).await
    }

    fn encode(&self, entity: &E) -> Result<Document, StoreError> {
        let encoding = |reason: String| StoreError::Encoding {
            collection: self.collection().to_string(),
            reason,
        };
        match serde_json::to_value(entity).map_err(|e| encoding(e.to_string()))? {
            Value::Object(doc) => Ok(doc),
            other => Err(encoding(format!("expected object, found {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_entities::Variant;

    use crate::store::InMemoryDocumentStore;

    fn variant(key: &str) -> Variant {
        Variant {
            key: BusinessKey::guard(key).unwrap(),
            name: "Large".into(),
            description: "Large size".into(),
            created_by: "alice".into(),
            modified_by: "alice".into(),
            status: false,
        }
    }

    async fn load(repo: &Repository<Variant>, key: &BusinessKey) -> Option<Variant> {
        repo.get(key)
            .await
            .unwrap()
            .map(|doc| serde_json::from_value(Value::Object(doc.body)).unwrap())
    }

    #[tokio::test]
    async fn insert_then_load_by_key() {
        let repo = Repository::<Variant>::new(Arc::new(InMemoryDocumentStore::new()));
        repo.insert(&variant("V001")).await.unwrap();

        let key = BusinessKey::guard("V001").unwrap();
        assert_eq!(repo.list().await.unwrap().len(), 1);
        assert_eq!(load(&repo, &key).await, Some(variant("V001")));
        assert!(load(&repo, &BusinessKey::guard("V002").unwrap()).await.is_none());
    }

    #[tokio::test]
    async fn status_update_touches_only_the_flag() {
        let repo = Repository::<Variant>::new(Arc::new(InMemoryDocumentStore::new()));
        repo.insert(&variant("V001")).await.unwrap();

        let key = BusinessKey::guard("V001").unwrap();
        repo.update_status(&StatusUpdate { key: key.clone(), status: true })
            .await
            .unwrap();

        let mut expected = variant("V001");
        expected.status = true;
        assert_eq!(load(&repo, &key).await, Some(expected));
    }
}
