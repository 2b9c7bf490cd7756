//! Infrastructure layer: document store adapters, integrity checks, mutation
//! execution and the per-entity operation pipeline.

pub mod catalog_service;
pub mod config;
pub mod executor;
pub mod integrity;
pub mod repository;
pub mod store;

pub use catalog_service::CatalogService;
pub use config::{CatalogConfig, ConfigError, StoreBackend};
pub use executor::{MutationExecutor, Outcome};
pub use integrity::{Admission, ReferencePolicy, ReferentialChecker};
pub use repository::Repository;
pub use store::{
    DeadlineStore, Document, DocumentStore, Filter, InMemoryDocumentStore, StoreError,
    StoredDocument,
};

#[cfg(feature = "postgres")]
pub use store::PostgresDocumentStore;
