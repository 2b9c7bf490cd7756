//! Configuration loading and representation.
//!
//! Everything comes from environment variables:
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `CATALOG_BIND_ADDR` | `0.0.0.0:8000` | HTTP listen address |
//! | `CATALOG_STORE_TIMEOUT_MS` | `5000` | Deadline for every store call |
//! | `CATALOG_UPDATE_REFERENCES` | `enforce` | `enforce` or `skip` parent checks on full updates |
//! | `USE_PERSISTENT_STORES` | `false` | Use Postgres instead of the in-memory store |
//! | `DATABASE_URL` | (none) | Required when persistent stores are used |

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use crate::integrity::ReferencePolicy;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is required: {reason}")]
    Missing { var: &'static str, reason: &'static str },

    #[error("{var} has invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Which document store backs the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    InMemory,
    /// Requested through `USE_PERSISTENT_STORES`. The URL is checked when the
    /// backend is built.
    Persistent { database_url: Option<String> },
}

impl StoreBackend {
    pub fn database_url(&self) -> Result<&str, ConfigError> {
        match self {
            StoreBackend::Persistent {
                database_url: Some(url),
            } => Ok(url),
            _ => Err(ConfigError::Missing {
                var: "DATABASE_URL",
                reason: "USE_PERSISTENT_STORES=true",
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    pub bind_addr: SocketAddr,
    pub store_timeout: Duration,
    pub update_references: ReferencePolicy,
    pub store: StoreBackend,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            store_timeout: DEFAULT_STORE_TIMEOUT,
            update_references: ReferencePolicy::Enforce,
            store: StoreBackend::InMemory,
        }
    }
}

impl CatalogConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_raw = lookup("CATALOG_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse::<SocketAddr>().map_err(|e| ConfigError::Invalid {
            var: "CATALOG_BIND_ADDR",
            value: bind_raw.clone(),
            reason: e.to_string(),
        })?;

        let store_timeout = match lookup("CATALOG_STORE_TIMEOUT_MS") {
            None => DEFAULT_STORE_TIMEOUT,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => Duration::from_millis(ms),
                Ok(_) => {
                    return Err(ConfigError::Invalid {
                        var: "CATALOG_STORE_TIMEOUT_MS",
                        value: raw,
                        reason: "must be greater than zero".to_string(),
                    });
                }
                Err(e) => {
                    return Err(ConfigError::Invalid {
                        var: "CATALOG_STORE_TIMEOUT_MS",
                        value: raw,
                        reason: e.to_string(),
                    });
                }
            },
        };

        let update_references = match lookup("CATALOG_UPDATE_REFERENCES") {
            None => ReferencePolicy::default(),
            Some(raw) => raw.parse().map_err(|reason| ConfigError::Invalid {
                var: "CATALOG_UPDATE_REFERENCES",
                value: raw.clone(),
                reason,
            })?,
        };

        let use_persistent = match lookup("USE_PERSISTENT_STORES") {
            None => false,
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "true" => true,
                "false" => false,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "USE_PERSISTENT_STORES",
                        value: raw,
                        reason: "expected true or false".to_string(),
                    });
                }
            },
        };
        let store = if use_persistent {
            StoreBackend::Persistent {
                database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            }
        } else {
            StoreBackend::InMemory
        };

        Ok(Self {
            bind_addr,
            store_timeout,
            update_references,
            store,
        })
    }
}
