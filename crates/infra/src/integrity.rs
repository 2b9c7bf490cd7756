//! Referential checks run before a mutation.
//!
//! The checker only gathers counts; [`decide`] turns them into an
//! [`Admission`]. A parent "exists" when at least one document in its
//! collection carries the referenced key.

use std::str::FromStr;
use std::sync::Arc;

use catalog_core::{BusinessKey, CatalogEntity, EntityKind, ParentRef};

use crate::store::{DocumentStore, Filter, StoreError};

/// Whether a mutation may go ahead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Admissible,
    /// The entity's own key is already taken.
    Duplicate,
    /// The first referenced parent (in reporting order) that does not exist.
    InvalidParent(ParentRef),
}

/// Whether full-record updates re-check the parents they write.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum ReferencePolicy {
    #[default]
    Enforce,
    Skip,
}

impl FromStr for ReferencePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "enforce" => Ok(Self::Enforce),
            "skip" => Ok(Self::Skip),
            other => Err(format!("expected `enforce` or `skip`, got `{other}`")),
        }
    }
}

/// Pure decision over gathered counts.
///
/// The own-key check wins over parent checks; parents are reported in the
/// order given.
pub fn decide(own_key_count: u64, parents: &[(ParentRef, u64)]) -> Admission {
    if own_key_count > 0 {
        return Admission::Duplicate;
    }
    parents
        .iter()
        .find(|(_, count)| *count == 0)
        .map(|(parent, _)| Admission::InvalidParent(parent.clone()))
        .unwrap_or(Admission::Admissible)
}

/// Issues the existence queries a create or update needs.
#[derive(Clone)]
pub struct ReferentialChecker {
    store: Arc<dyn DocumentStore>,
}

impl ReferentialChecker {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    async fn count_key(&self, kind: EntityKind, key: &BusinessKey) -> Result<u64, StoreError> {
        self.store
            .count(kind.collection(), &Filter::eq(kind.key_field(), key.as_str()))
            .await
    }

    async fn count_parents(&self, parents: Vec<ParentRef>) -> Result<Vec<(ParentRef, u64)>, StoreError> {
        let mut counted = Vec::with_capacity(parents.len());
        for parent in parents {
            let count = self.count_key(parent.kind, &parent.key).await?;
            counted.push((parent, count));
        }
        Ok(counted)
    }

    /// One uniqueness query for the entity's own key, then one existence
    /// query per referenced parent.
    pub async fn check_create<E: CatalogEntity>(&self, entity: &E) -> Result<Admission, StoreError> {
        let own = self.count_key(E::KIND, entity.key()).await?;
        let parents = self.count_parents(entity.parents()).await?;
        Ok(decide(own, &parents))
    }

    /// Existence queries only: the key being updated is expected to exist.
    pub async fn check_references(&self, parents: Vec<ParentRef>) -> Result<Admission, StoreError> {
        let parents = self.count_parents(parents).await?;
        Ok(decide(0, &parents))
    }
}
