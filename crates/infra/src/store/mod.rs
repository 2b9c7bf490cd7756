//! Document store boundary.
//!
//! The catalog keeps one collection per entity kind. Every operation the
//! upper layers need is expressed through [`DocumentStore`], so the same
//! pipeline runs against the in-memory store in tests and against Postgres
//! in production.

pub mod deadline;
pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod r#trait;

pub use deadline::DeadlineStore;
pub use in_memory::InMemoryDocumentStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresDocumentStore;
pub use r#trait::{Document, DocumentStore, Filter, StoreError, StoredDocument};
