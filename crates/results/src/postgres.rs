//! PostgreSQL-backed result store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use watchtower_core::ExecutionRecord;

use crate::error::ResultStoreError;
use crate::store::ResultStore;

/// Row from the `module_results` table.
#[derive(Debug, sqlx::FromRow)]
struct ResultRow {
    site_id: Option<Uuid>,
    module_id: Uuid,
    created_at: DateTime<Utc>,
    data_json: serde_json::Value,
}

impl From<ResultRow> for ExecutionRecord {
    fn from(row: ResultRow) -> Self {
        Self {
            site_id: row.site_id,
            module_id: row.module_id,
            timestamp: row.created_at,
            data: row.data_json,
        }
    }
}

pub struct PgResultStore {
    pool: PgPool,
}

impl PgResultStore {
    /// Connect and make sure the results table exists.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, ResultStoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn ensure_schema(&self) -> Result<(), ResultStoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS module_results (
                id uuid PRIMARY KEY,
                site_id uuid,
                module_id uuid NOT NULL,
                created_at timestamptz NOT NULL,
                data_json jsonb NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS module_results_lookup_idx
             ON module_results (module_id, site_id, created_at DESC)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl ResultStore for PgResultStore {
    async fn save(&self, record: &ExecutionRecord) -> Result<(), ResultStoreError> {
        sqlx::query(
            "INSERT INTO module_results (id, site_id, module_id, created_at, data_json)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(Uuid::new_v4())
        .bind(record.site_id)
        .bind(record.module_id)
        .bind(record.timestamp)
        .bind(&record.data)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn latest(
        &self,
        module_id: Uuid,
        site_id: Option<Uuid>,
    ) -> Result<Option<ExecutionRecord>, ResultStoreError> {
        let row = sqlx::query_as::<_, ResultRow>(
            "SELECT site_id, module_id, created_at, data_json
             FROM module_results
             WHERE module_id = $1
               AND ($2::uuid IS NULL OR site_id = $2)
             ORDER BY created_at DESC
             LIMIT 1",
        )
        .bind(module_id)
        .bind(site_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ExecutionRecord::from))
    }
}
