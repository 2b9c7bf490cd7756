use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use thiserror::Error;

use catalog_core::InternalId;

/// Field/value body of one stored document.
pub type Document = Map<String, Value>;

/// A document together with the internal identifier the store assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: InternalId,
    pub body: Document,
}

impl StoredDocument {
    pub fn new(id: InternalId, body: Document) -> Self {
        Self { id, body }
    }

    /// Wire form: the body plus `_id`.
    pub fn into_json(self) -> Value {
        let mut body = self.body;
        body.insert("_id".to_string(), Value::String(self.id.to_string()));
        Value::Object(body)
    }
}

/// Conjunction of field equality clauses.
///
/// Field names may be dotted paths (`subprod.brandid`) into nested objects.
/// An empty filter matches every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<(String, Value)>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::all().and(field, value)
    }

    pub fn and(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push((field.into(), value.into()));
        self
    }

    pub fn clauses(&self) -> &[(String, Value)] {
        &self.clauses
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.clauses
            .iter()
            .all(|(field, expected)| lookup(doc, field) == Some(expected))
    }

    /// The filter as a JSON object suitable for containment queries.
    pub fn to_json(&self) -> Value {
        let mut root = Map::new();
        for (field, value) in &self.clauses {
            let path: Vec<&str> = field.split('.').collect();
            insert_path(&mut root, &path, value.clone());
        }
        Value::Object(root)
    }
}

fn insert_path(node: &mut Map<String, Value>, path: &[&str], value: Value) {
    match path {
        [] => {}
        [last] => {
            node.insert((*last).to_string(), value);
        }
        [head, rest @ ..] => {
            let child = node
                .entry((*head).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(map) = child {
                insert_path(map, rest, value);
            } else {
                let mut map = Map::new();
                insert_path(&mut map, rest, value);
                *child = Value::Object(map);
            }
        }
    }
}

/// Resolve a dotted path inside a document.
pub fn lookup<'a>(doc: &'a Document, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = doc.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Document store operation error.
///
/// These are infrastructure failures; the catalog layer decides what each
/// one means for the operation in flight.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    /// A write would give two documents the same value for a unique field.
    #[error("duplicate value {value:?} for unique field {field} in {collection}")]
    DuplicateKey {
        collection: String,
        field: String,
        value: String,
    },

    /// The operation did not complete within the configured deadline.
    #[error("{operation} on {collection} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        collection: String,
        after: Duration,
    },

    /// A document could not be converted to or from its typed form.
    #[error("document encoding failed in {collection}: {reason}")]
    Encoding { collection: String, reason: String },

    /// The backend rejected the operation or could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Asynchronous access to named document collections.
///
/// Implementations must make `insert` atomic with respect to any unique
/// field registered through `ensure_unique`: of two concurrent inserts with
/// the same value, exactly one succeeds and the other fails with
/// [`StoreError::DuplicateKey`].
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Register `field` as unique within `collection`. Idempotent.
    async fn ensure_unique(&self, collection: &str, field: &str) -> Result<(), StoreError>;

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError>;

    async fn insert(&self, collection: &str, doc: Document) -> Result<InternalId, StoreError>;

    /// Every matching document, in insertion order.
    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<StoredDocument>, StoreError>;

    /// Apply `set` to the first match and return the document after the update.
    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: &Filter,
        set: Document,
    ) -> Result<Option<StoredDocument>, StoreError>;

    /// Remove at most one match; returns the number removed.
    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError>;
}

#[async_trait::async_trait]
impl<S> DocumentStore for Arc<S>
where
    S: DocumentStore + ?Sized,
{
    async fn ensure_unique(&self, collection: &str, field: &str) -> Result<(), StoreError> {
        (**self).ensure_unique(collection, field).await
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        (**self).count(collection, filter).await
    }

    async fn insert(&self, collection: &str, doc: Document) -> Result<InternalId, StoreError> {
        (**self).insert(collection, doc).await
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<StoredDocument>, StoreError> {
        (**self).find(collection, filter).await
    }

    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: &Filter,
        set: Document,
    ) -> Result<Option<StoredDocument>, StoreError> {
        (**self).find_one_and_update(collection, filter, set).await
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        (**self).delete_one(collection, filter).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(Filter::all().matches(&doc(json!({ "cid": "C001" }))));
        assert!(Filter::all().matches(&Document::new()));
    }

    #[test]
    fn dotted_paths_reach_nested_fields() {
        let product = doc(json!({ "pid": "P001", "subprod": { "brandid": "B001" } }));
        assert!(Filter::eq("subprod.brandid", "B001").matches(&product));
        assert!(!Filter::eq("subprod.brandid", "B002").matches(&product));
        assert!(!Filter::eq("pid.brandid", "B001").matches(&product));
    }

    #[test]
    fn clauses_are_conjunctive() {
        let brand = doc(json!({ "bid": "B001", "cid": "C001" }));
        assert!(Filter::eq("bid", "B001").and("cid", "C001").matches(&brand));
        assert!(!Filter::eq("bid", "B001").and("cid", "C002").matches(&brand));
    }

    #[test]
    fn containment_form_nests_dotted_paths() {
        let filter = Filter::eq("pid", "P001").and("subprod.brandid", "B001");
        assert_eq!(
            filter.to_json(),
            json!({ "pid": "P001", "subprod": { "brandid": "B001" } })
        );
    }

    #[test]
    fn wire_form_exposes_internal_id() {
        let id = InternalId::new();
        let stored = StoredDocument::new(id, doc(json!({ "vid": "V001" })));
        let wire = stored.into_json();
        assert_eq!(wire["_id"], json!(id.to_string()));
        assert_eq!(wire["vid"], "V001");
    }
}
