//! Catalog operation pipeline.
//!
//! Every per-entity operation runs the same sequence:
//!
//! ```text
//! payload / raw key
//!   ↓
//! 1. Field validation or identifier guard (no store access)
//!   ↓
//! 2. Referential check (create; full update under ReferencePolicy::Enforce)
//!   ↓
//! 3. Mutation or lookup (one store call)
//!   ↓
//! Outcome | CatalogError
//! ```
//!
//! All store calls for one operation are issued sequentially. The service
//! holds no mutable state; it can be shared behind an `Arc` and called
//! concurrently.
//!
//! ## Error Semantics
//!
//! - Schema violations → `CatalogError::Validation`, nothing queried
//! - Malformed lookup/delete key → `CatalogError::InvalidKey`, nothing queried
//! - Own key taken (checked, or caught by the unique index) → `CatalogError::Duplicate`
//! - Missing parent → `CatalogError::InvalidParent` naming the first missing one
//! - Store failure or deadline expiry → `CatalogError::Storage`
//!
//! "No document matched" is never an error: gets and updates yield
//! `Outcome::NotFound`, deletes yield `Outcome::Deleted { count: 0 }`.

use std::sync::Arc;

use tracing::{info, instrument, warn, Span};

use catalog_core::{
    BusinessKey, CatalogEntity, CatalogError, CatalogResult, EntityKind, EntityUpdate, Validate,
};

use crate::executor::{store_failure, MutationExecutor, Outcome};
use crate::integrity::{Admission, ReferencePolicy, ReferentialChecker};
use crate::repository::Repository;
use crate::store::{DocumentStore, StoreError};

/// Entry point for every catalog operation.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn DocumentStore>,
    checker: ReferentialChecker,
    executor: MutationExecutor,
    policy: ReferencePolicy,
}

impl CatalogService {
    pub fn new(store: Arc<dyn DocumentStore>, policy: ReferencePolicy) -> Self {
        Self {
            checker: ReferentialChecker::new(store.clone()),
            executor: MutationExecutor::new(store.clone()),
            store,
            policy,
        }
    }

    /// Declare every business key unique in its collection.
    ///
    /// Must run once before the service takes traffic.
    #[instrument(skip(self), err)]
    pub async fn bootstrap(&self) -> Result<(), StoreError> {
        for kind in EntityKind::ALL {
            self.store
                .ensure_unique(kind.collection(), kind.key_field())
                .await?;
        }
        Ok(())
    }

    fn repository<E: CatalogEntity>(&self) -> Repository<E> {
        Repository::new(self.store.clone())
    }

    #[instrument(skip_all, fields(kind = %E::KIND, key = tracing::field::Empty))]
    pub async fn create<E: CatalogEntity>(&self, draft: E::Draft) -> CatalogResult<Outcome> {
        let entity = validated(draft)?;
        Span::current().record("key", entity.key().as_str());

        let admission = self
            .checker
            .check_create(&entity)
            .await
            .map_err(|e| store_failure::<E>("check_create", e))?;
        admit::<E>(admission, entity.key())?;

        let outcome = self.executor.insert(&entity).await;
        match &outcome {
            Ok(Outcome::Created { id }) => info!(%id, "catalog entry created"),
            Err(CatalogError::Duplicate { .. }) => {
                warn!("create lost a race on the unique key")
            }
            _ => {}
        }
        outcome
    }

    #[instrument(skip(self), fields(kind = %E::KIND))]
    pub async fn get<E: CatalogEntity>(&self, raw_key: &str) -> CatalogResult<Outcome> {
        let key = guarded::<E>(raw_key)?;
        match self.repository::<E>().get(&key).await {
            Ok(Some(doc)) => Ok(Outcome::Found(doc)),
            Ok(None) => Ok(Outcome::NotFound),
            Err(e) => Err(store_failure::<E>("get", e)),
        }
    }

    /// Every document in the collection, unpaginated.
    #[instrument(skip(self), fields(kind = %E::KIND))]
    pub async fn list<E: CatalogEntity>(&self) -> CatalogResult<Outcome> {
        self.repository::<E>()
            .list()
            .await
            .map(Outcome::Listed)
            .map_err(|e| store_failure::<E>("list", e))
    }

    #[instrument(skip_all, fields(kind = %E::KIND, key = tracing::field::Empty))]
    pub async fn update<E: CatalogEntity>(&self, changes: E::Changes) -> CatalogResult<Outcome> {
        let update = validated(changes)?;
        Span::current().record("key", update.key().as_str());

        let parents = update.parents();
        if self.policy == ReferencePolicy::Enforce && !parents.is_empty() {
            let admission = self
                .checker
                .check_references(parents)
                .await
                .map_err(|e| store_failure::<E>("check_references", e))?;
            admit::<E>(admission, update.key())?;
        }

        let outcome = self.executor.update::<E>(&update).await?;
        log_update(&outcome);
        Ok(outcome)
    }

    #[instrument(skip_all, fields(kind = %E::KIND, key = tracing::field::Empty))]
    pub async fn update_status<E: CatalogEntity>(&self, changes: E::StatusChanges) -> CatalogResult<Outcome> {
        let update = validated(changes)?;
        Span::current().record("key", update.key.as_str());

        let outcome = self.executor.update_status::<E>(&update).await?;
        log_update(&outcome);
        Ok(outcome)
    }

    #[instrument(skip(self), fields(kind = %E::KIND))]
    pub async fn delete<E: CatalogEntity>(&self, raw_key: &str) -> CatalogResult<Outcome> {
        let key = guarded::<E>(raw_key)?;
        let outcome = self.executor.delete::<E>(&key).await?;
        if let Outcome::Deleted { count } = &outcome {
            info!(count, "catalog entry delete applied");
        }
        Ok(outcome)
    }
}

fn validated<P: Validate>(payload: P) -> CatalogResult<P::Valid> {
    payload.validate().map_err(|errors| {
        warn!(violations = %errors, "payload rejected");
        CatalogError::from(errors)
    })
}

fn guarded<E: CatalogEntity>(raw_key: &str) -> CatalogResult<BusinessKey> {
    BusinessKey::guard(raw_key).map_err(|e| {
        warn!(error = %e, "key rejected before lookup");
        CatalogError::InvalidKey { kind: E::KIND }
    })
}

fn admit<E: CatalogEntity>(admission: Admission, key: &BusinessKey) -> CatalogResult<()> {
    match admission {
        Admission::Admissible => Ok(()),
        Admission::Duplicate => {
            warn!("business key already taken");
            Err(CatalogError::Duplicate {
                kind: E::KIND,
                key: key.clone(),
            })
        }
        Admission::InvalidParent(parent) => {
            warn!(parent = %parent.kind, parent_key = %parent.key, "referenced parent missing");
            Err(CatalogError::InvalidParent {
                kind: E::KIND,
                parent: parent.kind,
                key: parent.key,
            })
        }
    }
}

fn log_update(outcome: &Outcome) {
    match outcome {
        Outcome::Updated(doc) => info!(id = %doc.id, "catalog entry updated"),
        Outcome::NotFound => info!("update matched nothing"),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use catalog_core::InternalId;
    use catalog_entities::{Category, CategoryDraft, Subcategory, SubcategoryChanges};
    use serde_json::{json, Value};

    use crate::store::{Document, Filter, InMemoryDocumentStore, StoredDocument};

    /// Records the name of every store call.
    #[derive(Default)]
    struct RecordingStore {
        inner: InMemoryDocumentStore,
        calls: Mutex<Vec<&'static str>>,
    }

    impl RecordingStore {
        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: &'static str) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait::async_trait]
    impl DocumentStore for RecordingStore {
        async fn ensure_unique(&self, collection: &str, field: &str) -> Result<(), StoreError> {
            self.record("ensure_unique");
            self.inner.ensure_unique(collection, field).await
        }

        async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
            self.record("count");
            self.inner.count(collection, filter).await
        }

        async fn insert(&self, collection: &str, doc: Document) -> Result<InternalId, StoreError> {
            self.record("insert");
            self.inner.insert(collection, doc).await
        }

        async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<StoredDocument>, StoreError> {
            self.record("find");
            self.inner.find(collection, filter).await
        }

        async fn find_one_and_update(
            &self,
            collection: &str,
            filter: &Filter,
            set: Document,
        ) -> Result<Option<StoredDocument>, StoreError> {
            self.record("find_one_and_update");
            self.inner.find_one_and_update(collection, filter, set).await
        }

        async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
            self.record("delete_one");
            self.inner.delete_one(collection, filter).await
        }
    }

    fn draft<T: serde::de::DeserializeOwned>(body: Value) -> T {
        serde_json::from_value(body).unwrap()
    }

    fn category_body(key: &str) -> Value {
        json!({
            "cid": key,
            "cname": "Apparel",
            "cdesc": "Clothing and accessories",
            "ccreatedby": "alice",
            "cmodifiedby": "alice",
        })
    }

    fn service_with(store: Arc<RecordingStore>, policy: ReferencePolicy) -> CatalogService {
        CatalogService::new(store, policy)
    }

    #[tokio::test]
    async fn malformed_lookup_key_never_reaches_the_store() {
        let store = Arc::new(RecordingStore::default());
        let service = service_with(store.clone(), ReferencePolicy::Enforce);

        for raw in ["", "C-01", "C 01", "c01;drop", "ÇÀT1"] {
            assert_eq!(
                service.get::<Category>(raw).await.unwrap_err(),
                CatalogError::InvalidKey { kind: EntityKind::Category }
            );
            assert_eq!(
                service.delete::<Category>(raw).await.unwrap_err(),
                CatalogError::InvalidKey { kind: EntityKind::Category }
            );
        }
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn invalid_payload_never_reaches_the_store() {
        let store = Arc::new(RecordingStore::default());
        let service = service_with(store.clone(), ReferencePolicy::Enforce);

        let err = service
            .create::<Category>(draft::<CategoryDraft>(json!({ "cid": "C001" })))
            .await
            .unwrap_err();

        assert!(matches!(err, CatalogError::Validation(_)));
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn create_checks_then_inserts_once() {
        let store = Arc::new(RecordingStore::default());
        let service = service_with(store.clone(), ReferencePolicy::Enforce);

        service
            .create::<Category>(draft(category_body("C001")))
            .await
            .unwrap();
        assert_eq!(store.calls(), vec!["count", "insert"]);
    }

    #[tokio::test]
    async fn lookup_of_unknown_key_is_not_found() {
        let store = Arc::new(RecordingStore::default());
        let service = service_with(store, ReferencePolicy::Enforce);

        assert_eq!(service.get::<Category>("C404").await.unwrap(), Outcome::NotFound);
    }

    #[tokio::test]
    async fn update_reference_policy_is_honoured() {
        let subcategory_update = || {
            draft::<SubcategoryChanges>(json!({
                "scid": "SC01",
                "cid": "C404",
                "scname": "Shirts",
                "scdesc": "Formal and casual shirts",
                "scmodifiedby": "bob",
            }))
        };
        let seed = json!({
            "scid": "SC01",
            "cid": "C001",
            "scname": "Shirts",
            "scdesc": "Formal and casual shirts",
            "sccreatedby": "alice",
            "scmodifiedby": "alice",
        });

        // Enforce: dangling reference rejected, nothing written.
        let store = Arc::new(RecordingStore::default());
        let enforce = service_with(store.clone(), ReferencePolicy::Enforce);
        enforce.create::<Category>(draft(category_body("C001"))).await.unwrap();
        enforce.create::<Subcategory>(draft(seed.clone())).await.unwrap();

        let err = enforce
            .update::<Subcategory>(subcategory_update())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            CatalogError::InvalidParent {
                kind: EntityKind::Subcategory,
                parent: EntityKind::Category,
                key: BusinessKey::guard("C404").unwrap(),
            }
        );
        assert!(!store.calls().contains(&"find_one_and_update"));

        // Skip: the update lands without a parent check.
        let store = Arc::new(RecordingStore::default());
        let skip = service_with(store.clone(), ReferencePolicy::Skip);
        skip.create::<Category>(draft(category_body("C001"))).await.unwrap();
        skip.create::<Subcategory>(draft(seed)).await.unwrap();

        let outcome = skip.update::<Subcategory>(subcategory_update()).await.unwrap();
        match outcome {
            Outcome::Updated(doc) => assert_eq!(doc.body["cid"], "C404"),
            other => panic!("expected update, got {other:?}"),
        }
    }
}
