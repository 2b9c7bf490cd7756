//! Mutation execution and outcome mapping.

use std::sync::Arc;

use tracing::error;

use catalog_core::{BusinessKey, CatalogEntity, CatalogError, CatalogResult, EntityUpdate, InternalId, StatusUpdate};

use crate::repository::Repository;
use crate::store::{DocumentStore, StoreError, StoredDocument};

/// Successful result of a catalog operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Created { id: InternalId },
    Found(StoredDocument),
    Listed(Vec<StoredDocument>),
    Updated(StoredDocument),
    Deleted { count: u64 },
    /// Lookup or update matched no document.
    NotFound,
}

/// Performs the single store write an admitted mutation needs and maps the
/// store's answer into an [`Outcome`].
#[derive(Clone)]
pub struct MutationExecutor {
    store: Arc<dyn DocumentStore>,
}

impl MutationExecutor {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    fn repository<E: CatalogEntity>(&self) -> Repository<E> {
        Repository::new(self.store.clone())
    }

    /// A unique-index rejection here means a concurrent create won the race.
    pub async fn insert<E: CatalogEntity>(&self, entity: &E) -> CatalogResult<Outcome> {
        match self.repository::<E>().insert(entity).await {
            Ok(id) => Ok(Outcome::Created { id }),
            Err(StoreError::DuplicateKey { .. }) => Err(CatalogError::Duplicate {
                kind: E::KIND,
                key: entity.key().clone(),
            }),
            Err(e) => Err(store_failure::<E>("insert", e)),
        }
    }

    pub async fn update<E: CatalogEntity>(&self, update: &E::Update) -> CatalogResult<Outcome> {
        match self.repository::<E>().update(update).await {
            Ok(Some(doc)) => Ok(Outcome::Updated(doc)),
            Ok(None) => Ok(Outcome::NotFound),
            Err(StoreError::DuplicateKey { .. }) => Err(CatalogError::Duplicate {
                kind: E::KIND,
                key: update.key().clone(),
            }),
            Err(e) => Err(store_failure::<E>("update", e)),
        }
    }

    pub async fn update_status<E: CatalogEntity>(&self, update: &StatusUpdate) -> CatalogResult<Outcome> {
        match self.repository::<E>().update_status(update).await {
            Ok(Some(doc)) => Ok(Outcome::Updated(doc)),
            Ok(None) => Ok(Outcome::NotFound),
            Err(e) => Err(store_failure::<E>("update_status", e)),
        }
    }

    pub async fn delete<E: CatalogEntity>(&self, key: &BusinessKey) -> CatalogResult<Outcome> {
        self.repository::<E>()
            .delete(key)
            .await
            .map(|count| Outcome::Deleted { count })
            .map_err(|e| store_failure::<E>("delete", e))
    }
}

/// Log a store failure and convert it to the operation's error.
pub(crate) fn store_failure<E: CatalogEntity>(operation: &'static str, err: StoreError) -> CatalogError {
    error!(kind = %E::KIND, operation, error = %err, "catalog store operation failed");
    CatalogError::storage(err.to_string())
}
