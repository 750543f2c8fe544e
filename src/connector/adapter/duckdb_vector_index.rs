use std::sync::Arc;

use async_trait::async_trait;
use duckdb::{params, Connection};
use tokio::sync::Mutex;
use tracing::debug;

use crate::application::VectorIndex;
use crate::domain::{DomainError, VectorItem};

/// Vector-search projection table on DuckDB. Embeddings are produced later by
/// the follow-up job; this adapter only maintains the item rows.
pub struct DuckdbVectorIndex {
    conn: Arc<Mutex<Connection>>,
}

impl DuckdbVectorIndex {
    pub async fn with_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, DomainError> {
        let conn_guard = conn.lock().await;
        Self::initialize_schema(&conn_guard)?;
        drop(conn_guard);

        Ok(Self { conn })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), DomainError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS vector_items (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                entity_type TEXT NOT NULL,
                content TEXT NOT NULL,
                title TEXT NOT NULL,
                created_at BIGINT NOT NULL,
                updated_at BIGINT,
                status TEXT NOT NULL
            );
            "#,
        )
        .map_err(|e| DomainError::storage(format!("Failed to initialize vector schema: {}", e)))?;

        debug!("DuckDB vector_items table initialized");
        Ok(())
    }
}

#[async_trait]
impl VectorIndex for DuckdbVectorIndex {
    async fn upsert(&self, items: &[VectorItem]) -> Result<usize, DomainError> {
        if items.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn.lock().await;
        let tx = conn
            .transaction()
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        {
            let mut stmt = tx
                .prepare(
                    r#"INSERT INTO vector_items (
                        id, user_id, entity_type, content, title, created_at, updated_at, status
                    ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                    ON CONFLICT (id) DO UPDATE SET
                        user_id = excluded.user_id,
                        entity_type = excluded.entity_type,
                        content = excluded.content,
                        title = excluded.title,
                        created_at = excluded.created_at,
                        updated_at = excluded.updated_at,
                        status = excluded.status
                    "#,
                )
                .map_err(|e| DomainError::storage(format!("Failed to prepare statement: {}", e)))?;

            for item in items {
                stmt.execute(params![
                    item.id,
                    item.user_id,
                    item.entity_type,
                    item.content,
                    item.title,
                    item.created_at,
                    item.updated_at,
                    item.status,
                ])
                .map_err(|e| DomainError::storage(format!("Failed to upsert vector item: {}", e)))?;
            }
        }

        tx.commit()
            .map_err(|e| DomainError::storage(format!("Failed to commit: {}", e)))?;

        debug!("Upserted {} vector items to DuckDB", items.len());
        Ok(items.len())
    }

    async fn get(&self, id: &str) -> Result<Option<VectorItem>, DomainError> {
        let conn = self.conn.lock().await;
        let found = conn.query_row(
            r#"SELECT id, user_id, entity_type, content, title, created_at, updated_at, status
               FROM vector_items WHERE id = ?1"#,
            params![id],
            |row| {
                Ok(VectorItem {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    entity_type: row.get(2)?,
                    content: row.get(3)?,
                    title: row.get(4)?,
                    created_at: row.get(5)?,
                    updated_at: row.get(6)?,
                    status: row.get(7)?,
                })
            },
        );

        match found {
            Ok(item) => Ok(Some(item)),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DomainError::storage(format!(
                "Failed to query vector item: {}",
                e
            ))),
        }
    }

    async fn count(&self) -> Result<u64, DomainError> {
        let conn = self.conn.lock().await;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM vector_items", [], |row| row.get(0))
            .map_err(|e| DomainError::storage(format!("Failed to count vector items: {}", e)))?;
        Ok(count as u64)
    }
}
