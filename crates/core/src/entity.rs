//! Entity kinds and the trait every catalog entity implements.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::id::BusinessKey;
use crate::validation::Validate;

/// The five linked catalog entity types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Category,
    Subcategory,
    Brand,
    Variant,
    Product,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Category,
        EntityKind::Subcategory,
        EntityKind::Brand,
        EntityKind::Variant,
        EntityKind::Product,
    ];

    /// Name of the collection holding documents of this kind.
    pub fn collection(self) -> &'static str {
        match self {
            EntityKind::Category => "Category",
            EntityKind::Subcategory => "Subcategory",
            EntityKind::Brand => "Brand",
            EntityKind::Variant => "Variant",
            EntityKind::Product => "Product",
        }
    }

    /// Document field carrying the business key.
    pub fn key_field(self) -> &'static str {
        match self {
            EntityKind::Category => "cid",
            EntityKind::Subcategory => "scid",
            EntityKind::Brand => "bid",
            EntityKind::Variant => "vid",
            EntityKind::Product => "pid",
        }
    }

    /// Document field carrying the status flag.
    pub fn status_field(self) -> &'static str {
        match self {
            EntityKind::Category => "cstatus",
            EntityKind::Subcategory => "scstatus",
            EntityKind::Brand => "bstatus",
            EntityKind::Variant => "vstatus",
            EntityKind::Product => "pstatus",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Category => "category",
            EntityKind::Subcategory => "subcategory",
            EntityKind::Brand => "brand",
            EntityKind::Variant => "variant",
            EntityKind::Product => "product",
        }
    }
}

impl core::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// A reference from a child document to a parent's business key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentRef {
    pub kind: EntityKind,
    pub key: BusinessKey,
}

impl ParentRef {
    pub fn new(kind: EntityKind, key: BusinessKey) -> Self {
        Self { kind, key }
    }
}

/// A catalog entity as persisted: one document per record, keyed by its
/// business key.
///
/// The associated payload types are the loosely typed request bodies; their
/// [`Validate`] impls are the per-entity field validators.
pub trait CatalogEntity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const KIND: EntityKind;

    /// Create payload.
    type Draft: Validate<Valid = Self> + DeserializeOwned + Send + 'static;
    /// Full-record update payload.
    type Changes: Validate<Valid = Self::Update> + DeserializeOwned + Send + 'static;
    /// Status-only update payload.
    type StatusChanges: Validate<Valid = StatusUpdate> + DeserializeOwned + Send + 'static;
    /// Validated full-record update.
    type Update: EntityUpdate;

    fn key(&self) -> &BusinessKey;

    /// Referenced parents, in the order missing parents are reported.
    fn parents(&self) -> Vec<ParentRef> {
        Vec::new()
    }
}

/// A validated full-record update: a match key plus a fixed field set.
pub trait EntityUpdate: Clone + Send + Sync + 'static {
    fn key(&self) -> &BusinessKey;

    /// Parent references the update writes, in reporting order.
    fn parents(&self) -> Vec<ParentRef> {
        Vec::new()
    }

    /// Field replacements applied to the matched document.
    fn assignments(&self) -> Map<String, Value>;
}

/// A validated status-only update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub key: BusinessKey,
    pub status: bool,
}

impl StatusUpdate {
    /// The single field replacement for `kind`'s status flag.
    pub fn assignment(&self, kind: EntityKind) -> Map<String, Value> {
        let mut set = Map::new();
        set.insert(kind.status_field().to_string(), Value::Bool(self.status));
        set
    }
}
