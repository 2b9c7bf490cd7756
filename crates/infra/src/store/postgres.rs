//! Postgres-backed document store.
//!
//! All collections share one table; each document is a JSONB body tagged
//! with its collection name:
//!
//! ```sql
//! CREATE TABLE catalog_documents (
//!     id          UUID PRIMARY KEY,
//!     collection  TEXT NOT NULL,
//!     body        JSONB NOT NULL,
//!     inserted_at TIMESTAMPTZ NOT NULL DEFAULT now()
//! );
//! ```
//!
//! Equality filters become `body @> $filter` containment checks. Unique
//! fields are partial expression indexes on `body ->> field`, one per
//! collection, so a racing duplicate insert fails inside Postgres.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `DuplicateKey` |
//! | Database (other) | Any other | `Unavailable` |
//! | PoolClosed | N/A | `Unavailable` |
//! | Other | N/A | `Unavailable` |

use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use catalog_core::InternalId;

use super::r#trait::{Document, DocumentStore, Filter, StoreError, StoredDocument};

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS catalog_documents (
    id          UUID PRIMARY KEY,
    collection  TEXT NOT NULL,
    body        JSONB NOT NULL,
    inserted_at TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

const CREATE_COLLECTION_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS catalog_documents_collection_idx
    ON catalog_documents (collection, inserted_at)
"#;

/// Postgres-backed document store.
#[derive(Debug, Clone)]
pub struct PostgresDocumentStore {
    pool: Arc<PgPool>,
}

impl PostgresDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect and make sure the backing table exists.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", "catalog_documents", e))?;
        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> Result<(), StoreError> {
        for statement in [CREATE_TABLE, CREATE_COLLECTION_INDEX] {
            sqlx::query(statement)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("migrate", "catalog_documents", e))?;
        }
        Ok(())
    }
}

fn is_identifier(raw: &str) -> bool {
    !raw.is_empty() && raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn unique_index_name(collection: &str, field: &str) -> String {
    format!("catalog_documents_{}_{}_key", collection.to_lowercase(), field.to_lowercase())
}

fn row_to_document(collection: &str, row: &sqlx::postgres::PgRow) -> Result<StoredDocument, StoreError> {
    let encoding = |e: sqlx::Error| StoreError::Encoding {
        collection: collection.to_string(),
        reason: e.to_string(),
    };
    let id: Uuid = row.try_get("id").map_err(encoding)?;
    let body: Value = row.try_get("body").map_err(encoding)?;
    match body {
        Value::Object(body) => Ok(StoredDocument::new(InternalId::from_uuid(id), body)),
        other => Err(StoreError::Encoding {
            collection: collection.to_string(),
            reason: format!("expected object body, found {other}"),
        }),
    }
}

#[async_trait::async_trait]
impl DocumentStore for PostgresDocumentStore {
    #[instrument(skip(self), err)]
    async fn ensure_unique(&self, collection: &str, field: &str) -> Result<(), StoreError> {
        // Identifiers are spliced into DDL; only plain names are accepted.
        if !is_identifier(collection) || !is_identifier(field) {
            return Err(StoreError::Unavailable(format!(
                "refusing unique index on {collection}.{field}"
            )));
        }
        let statement = format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS {index} ON catalog_documents ((body ->> '{field}')) \
             WHERE collection = '{collection}'",
            index = unique_index_name(collection, field),
        );
        sqlx::query(&statement)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_unique", collection, e))?;
        Ok(())
    }

    #[instrument(skip(self, filter), err)]
    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS n FROM catalog_documents WHERE collection = $1 AND body @> $2",
        )
        .bind(collection)
        .bind(filter.to_json())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("count", collection, e))?;
        let n: i64 = row
            .try_get("n")
            .map_err(|e| map_sqlx_error("count", collection, e))?;
        Ok(n.max(0) as u64)
    }

    #[instrument(skip(self, doc), err)]
    async fn insert(&self, collection: &str, doc: Document) -> Result<InternalId, StoreError> {
        let id = InternalId::new();
        sqlx::query("INSERT INTO catalog_documents (id, collection, body) VALUES ($1, $2, $3)")
            .bind(*id.as_uuid())
            .bind(collection)
            .bind(Value::Object(doc))
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert", collection, e))?;
        Ok(id)
    }

    #[instrument(skip(self, filter), err)]
    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<StoredDocument>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, body
            FROM catalog_documents
            WHERE collection = $1 AND body @> $2
            ORDER BY inserted_at ASC, id ASC
            "#,
        )
        .bind(collection)
        .bind(filter.to_json())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find", collection, e))?;

        rows.iter().map(|row| row_to_document(collection, row)).collect()
    }

    #[instrument(skip(self, filter, set), err)]
    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: &Filter,
        set: Document,
    ) -> Result<Option<StoredDocument>, StoreError> {
        let row = sqlx::query(
            r#"
            UPDATE catalog_documents
            SET body = body || $3
            WHERE id = (
                SELECT id FROM catalog_documents
                WHERE collection = $1 AND body @> $2
                ORDER BY inserted_at ASC, id ASC
                LIMIT 1
                FOR UPDATE
            )
            RETURNING id, body
            "#,
        )
        .bind(collection)
        .bind(filter.to_json())
        .bind(Value::Object(set))
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_one_and_update", collection, e))?;

        row.as_ref()
            .map(|row| row_to_document(collection, row))
            .transpose()
    }

    #[instrument(skip(self, filter), err)]
    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM catalog_documents
            WHERE id = (
                SELECT id FROM catalog_documents
                WHERE collection = $1 AND body @> $2
                ORDER BY inserted_at ASC, id ASC
                LIMIT 1
            )
            "#,
        )
        .bind(collection)
        .bind(filter.to_json())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("delete_one", collection, e))?;
        Ok(result.rows_affected())
    }
}

/// Map SQLx errors to store errors.
fn map_sqlx_error(operation: &str, collection: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            if db_err.code().as_deref() == Some("23505") {
                StoreError::DuplicateKey {
                    collection: collection.to_string(),
                    field: db_err.constraint().unwrap_or("unknown").to_string(),
                    value: db_err.message().to_string(),
                }
            } else {
                StoreError::Unavailable(format!(
                    "database error in {operation}: {}",
                    db_err.message()
                ))
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Unavailable(format!("connection pool closed in {operation}"))
        }
        other => StoreError::Unavailable(format!("sqlx error in {operation}: {other}")),
    }
}
