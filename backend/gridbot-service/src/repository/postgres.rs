use super::document_store::{document_id, DocumentStore, StoreError};
use crate::config::DatabaseConfig;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::migrate::Migrator;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use std::time::Duration;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Document store backed by a PostgreSQL JSONB table
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect, run migrations and return a ready store
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(&config.url)
            .await?;

        MIGRATOR
            .run(&pool)
            .await
            .map_err(|e| StoreError::Backend(format!("migration failed: {e}")))?;

        tracing::info!(max_connections = config.max_connections, "document store connected");
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn get(&self, id: &str) -> Result<Vec<Value>, StoreError> {
        let rows: Vec<Json<Value>> =
            sqlx::query_scalar("SELECT body FROM like_documents WHERE id = $1")
                .bind(id)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(|Json(body)| body).collect())
    }

    async fn put(&self, document: Value) -> Result<(), StoreError> {
        let id = document_id(&document)?.to_string();

        sqlx::query(
            r#"
            INSERT INTO like_documents (id, body, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (id) DO UPDATE
            SET body = EXCLUDED.body, updated_at = now()
            "#,
        )
        .bind(&id)
        .bind(Json(&document))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
