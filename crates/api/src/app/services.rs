use std::sync::Arc;

use thiserror::Error;

use catalog_infra::{
    CatalogConfig, CatalogService, ConfigError, DeadlineStore, DocumentStore, InMemoryDocumentStore,
    StoreBackend, StoreError,
};

#[cfg(feature = "postgres")]
use catalog_infra::PostgresDocumentStore;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppServices {
    pub catalog: CatalogService,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("document store bootstrap failed: {0}")]
    Store(#[from] StoreError),
}

pub async fn build_services(config: &CatalogConfig) -> Result<AppServices, StartupError> {
    if matches!(config.store, StoreBackend::Persistent { .. }) {
        #[cfg(feature = "postgres")]
        {
            return build_persistent_services(config).await;
        }
        #[cfg(not(feature = "postgres"))]
        {
            tracing::warn!(
                "USE_PERSISTENT_STORES=true but postgres feature not enabled, falling back to in-memory"
            );
            return build_in_memory_services(config).await;
        }
    }

    build_in_memory_services(config).await
}

pub async fn build_in_memory_services(config: &CatalogConfig) -> Result<AppServices, StartupError> {
    wire(Arc::new(InMemoryDocumentStore::new()), config).await
}

#[cfg(feature = "postgres")]
async fn build_persistent_services(config: &CatalogConfig) -> Result<AppServices, StartupError> {
    let database_url = config.store.database_url()?;
    let store = PostgresDocumentStore::connect(database_url).await?;
    wire(Arc::new(store), config).await
}

/// Bound every store call by the configured deadline and declare the unique keys.
async fn wire(store: Arc<dyn DocumentStore>, config: &CatalogConfig) -> Result<AppServices, StartupError> {
    let store: Arc<dyn DocumentStore> = Arc::new(DeadlineStore::new(store, config.store_timeout));
    let catalog = CatalogService::new(store, config.update_references);
    catalog.bootstrap().await?;

    tracing::info!(
        policy = ?config.update_references,
        timeout_ms = config.store_timeout.as_millis() as u64,
        "catalog services ready"
    );
    Ok(AppServices { catalog })
}
