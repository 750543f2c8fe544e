use std::sync::Arc;

use async_trait::async_trait;
use duckdb::{params, Connection};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::application::JobQueue;
use crate::domain::{current_timestamp, DomainError, JobHandle, JobPayload};

/// Outbox-style job queue: jobs are appended to `follow_up_jobs` with status
/// `pending` for an external worker to claim.
pub struct DuckdbJobQueue {
    conn: Arc<Mutex<Connection>>,
}

impl DuckdbJobQueue {
    pub async fn with_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, DomainError> {
        let conn_guard = conn.lock().await;
        Self::initialize_schema(&conn_guard)?;
        drop(conn_guard);

        Ok(Self { conn })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), DomainError> {
        conn.execute_batch(
            r#"
            CREATE SEQUENCE IF NOT EXISTS follow_up_jobs_seq;

            CREATE TABLE IF NOT EXISTS follow_up_jobs (
                id TEXT PRIMARY KEY,
                seq BIGINT NOT NULL DEFAULT nextval('follow_up_jobs_seq'),
                name TEXT NOT NULL,
                entity_id TEXT NOT NULL,
                payload TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                enqueued_at BIGINT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_follow_up_jobs_status ON follow_up_jobs(status);
            "#,
        )
        .map_err(|e| DomainError::storage(format!("Failed to initialize job schema: {}", e)))?;

        debug!("DuckDB follow_up_jobs table initialized");
        Ok(())
    }

    /// Pending jobs in enqueue order. `enqueued_at` has second resolution, so
    /// the order comes from `seq`.
    pub async fn pending(&self, limit: usize) -> Result<Vec<(String, JobPayload)>, DomainError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(
                "SELECT name, payload FROM follow_up_jobs WHERE status = 'pending' ORDER BY seq LIMIT ?1",
            )
            .map_err(|e| DomainError::storage(format!("Failed to prepare statement: {}", e)))?;

        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(|e| DomainError::storage(format!("Failed to query jobs: {}", e)))?;

        let mut jobs = Vec::new();
        for row in rows {
            let (name, payload) =
                row.map_err(|e| DomainError::storage(format!("Failed to read row: {}", e)))?;
            let payload = serde_json::from_str(&payload)
                .map_err(|e| DomainError::storage(format!("Corrupt job payload: {}", e)))?;
            jobs.push((name, payload));
        }
        Ok(jobs)
    }
}

#[async_trait]
impl JobQueue for DuckdbJobQueue {
    async fn enqueue(&self, name: &str, payload: &JobPayload) -> Result<JobHandle, DomainError> {
        let id = Uuid::new_v4().to_string();
        let body = serde_json::to_string(payload)
            .map_err(|e| DomainError::internal(format!("Failed to encode job payload: {}", e)))?;

        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO follow_up_jobs (id, name, entity_id, payload, enqueued_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, name, payload.entity_id, body, current_timestamp()],
        )
        .map_err(|e| DomainError::storage(format!("Failed to enqueue job: {}", e)))?;

        debug!("Enqueued {} job {} for {}", name, id, payload.entity_id);
        Ok(JobHandle { id })
    }

    async fn pending_count(&self) -> Result<u64, DomainError> {
        let conn = self.conn.lock().await;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM follow_up_jobs WHERE status = 'pending'",
                [],
                |row| row.get(0),
            )
            .map_err(|e| DomainError::storage(format!("Failed to count jobs: {}", e)))?;
        Ok(count as u64)
    }
}
