//! Postgres document store: one JSONB row per document

use crate::backend::DocumentStore;
use crate::config::StoreConfig;
use crate::document::{Document, DocumentPath, DocumentWrite, WriteBatch, WriteMode};
use crate::error::{Result, StoreError};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use sqlx::PgExecutor;
use tracing::info;

const CREATE_DOCUMENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    collection TEXT NOT NULL,
    id TEXT NOT NULL,
    data JSONB NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    PRIMARY KEY (collection, id)
)
"#;

// $4 lists the fields stamped with NOW() on top of the incoming data
const REPLACE_DOCUMENT: &str = r#"
INSERT INTO documents (collection, id, data, updated_at)
VALUES (
    $1, $2,
    $3::jsonb || (SELECT COALESCE(jsonb_object_agg(field, to_jsonb(NOW())), '{}'::jsonb) FROM unnest($4::text[]) AS field),
    NOW()
)
ON CONFLICT (collection, id)
DO UPDATE SET
    data = EXCLUDED.data,
    updated_at = EXCLUDED.updated_at
"#;

// `||` on two JSONB objects is a shallow merge where the right side wins
const MERGE_DOCUMENT: &str = r#"
INSERT INTO documents (collection, id, data, updated_at)
VALUES (
    $1, $2,
    $3::jsonb || (SELECT COALESCE(jsonb_object_agg(field, to_jsonb(NOW())), '{}'::jsonb) FROM unnest($4::text[]) AS field),
    NOW()
)
ON CONFLICT (collection, id)
DO UPDATE SET
    data = documents.data || EXCLUDED.data,
    updated_at = EXCLUDED.updated_at
"#;

const SELECT_DOCUMENT: &str = "SELECT data FROM documents WHERE collection = $1 AND id = $2";

/// Document store backed by a Postgres `documents` table
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect using the configured database URL and pool size
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the documents table if it does not exist yet
    pub async fn initialize(&self) -> Result<()> {
        sqlx::query(CREATE_DOCUMENTS_TABLE).execute(&self.pool).await?;
        info!("Postgres document store initialized");
        Ok(())
    }

    async fn execute_write<'e, E>(executor: E, write: &DocumentWrite) -> Result<()>
    where
        E: PgExecutor<'e>,
    {
        let sql = match write.mode {
            WriteMode::Replace => REPLACE_DOCUMENT,
            WriteMode::Merge => MERGE_DOCUMENT,
        };

        sqlx::query(sql)
            .bind(write.path.collection())
            .bind(write.path.id())
            .bind(Json(&write.data))
            .bind(write.server_timestamps.clone())
            .execute(executor)
            .await?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl DocumentStore for PostgresStore {
    async fn get(&self, path: &DocumentPath) -> Result<Option<Document>> {
        path.validate()?;

        let row = sqlx::query_scalar::<_, Json<Document>>(SELECT_DOCUMENT)
            .bind(path.collection())
            .bind(path.id())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|Json(doc)| doc))
    }

    async fn set(&self, write: DocumentWrite) -> Result<()> {
        write.validate()?;
        Self::execute_write(&self.pool, &write).await
    }

    async fn commit(&self, batch: WriteBatch) -> Result<usize> {
        batch.validate()?;

        let mut tx = self.pool.begin().await.map_err(StoreError::Database)?;
        for write in batch.writes() {
            // Dropping `tx` on error rolls the whole batch back
            Self::execute_write(&mut *tx, write).await?;
        }
        tx.commit().await?;

        Ok(batch.len())
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
