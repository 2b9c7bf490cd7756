use std::future::Future;
use std::time::Duration;

use catalog_core::InternalId;

use super::r#trait::{Document, DocumentStore, Filter, StoreError, StoredDocument};

/// Adapter that bounds every store call by a fixed deadline.
///
/// A call that does not finish in time fails with [`StoreError::Timeout`];
/// the inner future is dropped.
#[derive(Debug, Clone)]
pub struct DeadlineStore<S> {
    inner: S,
    deadline: Duration,
}

impl<S> DeadlineStore<S> {
    pub fn new(inner: S, deadline: Duration) -> Self {
        Self { inner, deadline }
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        collection: &str,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        match tokio::time::timeout(self.deadline, call).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout {
                operation,
                collection: collection.to_string(),
                after: self.deadline,
            }),
        }
    }
}

#[async_trait::async_trait]
impl<S: DocumentStore> DocumentStore for DeadlineStore<S> {
    async fn ensure_unique(&self, collection: &str, field: &str) -> Result<(), StoreError> {
        self.bounded("ensure_unique", collection, self.inner.ensure_unique(collection, field))
            .await
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        self.bounded("count", collection, self.inner.count(collection, filter))
            .await
    }

    async fn insert(&self, collection: &str, doc: Document) -> Result<InternalId, StoreError> {
        self.bounded("insert", collection, self.inner.insert(collection, doc))
            .await
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<StoredDocument>, StoreError> {
        self.bounded("find", collection, self.inner.find(collection, filter))
            .await
    }

    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: &Filter,
        set: Document,
    ) -> Result<Option<StoredDocument>, StoreError> {
        self.bounded(
            "find_one_and_update",
            collection,
            self.inner.find_one_and_update(collection, filter, set),
        )
        .await
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        self.bounded("delete_one", collection, self.inner.delete_one(collection, filter))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryDocumentStore;

    /// Answers `count` only after a long pause; everything else is immediate.
    struct SlowCount(InMemoryDocumentStore);

    #[async_trait::async_trait]
    impl DocumentStore for SlowCount {
        async fn ensure_unique(&self, collection: &str, field: &str) -> Result<(), StoreError> {
            self.0.ensure_unique(collection, field).await
        }

        async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            self.0.count(collection, filter).await
        }

        async fn insert(&self, collection: &str, doc: Document) -> Result<InternalId, StoreError> {
            self.0.insert(collection, doc).await
        }

        async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<StoredDocument>, StoreError> {
            self.0.find(collection, filter).await
        }

        async fn find_one_and_update(
            &self,
            collection: &str,
            filter: &Filter,
            set: Document,
        ) -> Result<Option<StoredDocument>, StoreError> {
            self.0.find_one_and_update(collection, filter, set).await
        }

        async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
            self.0.delete_one(collection, filter).await
        }
    }

    #[tokio::test]
    async fn slow_call_times_out() {
        let store = DeadlineStore::new(SlowCount(InMemoryDocumentStore::new()), Duration::from_millis(20));
        let err = store.count("Category", &Filter::all()).await.unwrap_err();
        assert_eq!(
            err,
            StoreError::Timeout {
                operation: "count",
                collection: "Category".into(),
                after: Duration::from_millis(20),
            }
        );
    }

    #[tokio::test]
    async fn fast_calls_pass_through() {
        let store = DeadlineStore::new(SlowCount(InMemoryDocumentStore::new()), Duration::from_millis(200));
        store.insert("Variant", Document::new()).await.unwrap();
        assert_eq!(store.find("Variant", &Filter::all()).await.unwrap().len(), 1);
    }
}
