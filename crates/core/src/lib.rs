//! `catalog-core`: catalog foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! business keys and the identifier guard, entity kinds and the entity trait,
//! field validation, and the error taxonomy shared by every layer.

pub mod entity;
pub mod error;
pub mod id;
pub mod validation;

pub use entity::{CatalogEntity, EntityKind, EntityUpdate, ParentRef, StatusUpdate};
pub use error::{CatalogError, CatalogResult};
pub use id::{BusinessKey, InternalId};
pub use validation::{FieldValidator, FieldViolation, Validate, ValidationErrors, ViolationKind};
