//! Catalog error model.

use thiserror::Error;

use crate::entity::EntityKind;
use crate::id::BusinessKey;
use crate::validation::ValidationErrors;

/// Result type used across the catalog layers.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Failure of a single catalog operation.
///
/// Every variant is local to the operation that produced it. "Nothing matched"
/// is not in here: lookups, updates and deletes that match no document are a
/// normal outcome.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CatalogError {
    /// The request body could not be decoded into the expected payload.
    #[error("malformed request body: {0}")]
    Decode(String),

    /// The payload violated the entity's field schema.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// A lookup or delete key failed the identifier guard.
    #[error("please supply a correct {kind} key")]
    InvalidKey { kind: EntityKind },

    /// The business key is already taken in the entity's collection.
    #[error("duplicate {kind}: {key}")]
    Duplicate { kind: EntityKind, key: BusinessKey },

    /// A referenced parent does not exist.
    #[error("invalid {parent} {key} referenced by {kind}")]
    InvalidParent {
        kind: EntityKind,
        parent: EntityKind,
        key: BusinessKey,
    },

    /// The data store failed or did not answer within its deadline.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl CatalogError {
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Stable machine-readable code for this failure.
    pub fn code(&self) -> &'static str {
        match self {
            CatalogError::Decode(_) => "decode_error",
            CatalogError::Validation(_) => "validation_error",
            CatalogError::InvalidKey { .. } => "invalid_key",
            CatalogError::Duplicate { .. } => "duplicate",
            CatalogError::InvalidParent { .. } => "invalid_parent",
            CatalogError::Storage(_) => "store_error",
        }
    }
}

impl From<ValidationErrors> for CatalogError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value)
    }
}
