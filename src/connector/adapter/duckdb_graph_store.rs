use std::sync::Arc;

use async_trait::async_trait;
use duckdb::{params, Connection};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::application::{GraphClient, GraphSession};
use crate::domain::{DomainError, GraphNode, GraphWrite, GraphWriteSummary};

/// Property-graph store on DuckDB. Nodes live in `graph_nodes`, keyed by id,
/// with their label and a JSON property map.
///
/// Each session runs on its own cloned connection to the same database, which
/// is closed when the session is closed or dropped.
pub struct DuckdbGraphStore {
    conn: Arc<Mutex<Connection>>,
}

impl DuckdbGraphStore {
    pub async fn with_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, DomainError> {
        let conn_guard = conn.lock().await;
        Self::initialize_schema(&conn_guard)?;
        drop(conn_guard);

        Ok(Self { conn })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), DomainError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS graph_nodes (
                id TEXT PRIMARY KEY,
                label TEXT NOT NULL,
                properties TEXT NOT NULL
            );
            "#,
        )
        .map_err(|e| DomainError::storage(format!("Failed to initialize graph schema: {}", e)))?;

        debug!("DuckDB graph_nodes table initialized");
        Ok(())
    }

    pub async fn node(&self, id: &str) -> Result<Option<GraphNode>, DomainError> {
        let conn = self.conn.lock().await;
        let found = conn.query_row(
            "SELECT id, label, properties FROM graph_nodes WHERE id = ?1",
            params![id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        );

        match found {
            Ok((id, label, properties)) => {
                let properties = serde_json::from_str(&properties).map_err(|e| {
                    DomainError::storage(format!("Corrupt properties on node {}: {}", id, e))
                })?;
                Ok(Some(GraphNode {
                    label,
                    id,
                    properties,
                }))
            }
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DomainError::storage(format!("Failed to query node: {}", e))),
        }
    }
}

#[async_trait]
impl GraphClient for DuckdbGraphStore {
    async fn open_session(&self) -> Result<Box<dyn GraphSession>, DomainError> {
        let conn = self.conn.lock().await;
        let session_conn = conn
            .try_clone()
            .map_err(|e| DomainError::unavailable(format!("Failed to open graph session: {}", e)))?;

        Ok(Box::new(DuckdbGraphSession {
            conn: Some(session_conn),
        }))
    }
}

struct DuckdbGraphSession {
    conn: Option<Connection>,
}

impl DuckdbGraphSession {
    fn connection(&self) -> Result<&Connection, DomainError> {
        self.conn
            .as_ref()
            .ok_or_else(|| DomainError::unavailable("graph session is closed"))
    }
}

#[async_trait]
impl GraphSession for DuckdbGraphSession {
    async fn execute(&mut self, write: &GraphWrite) -> Result<GraphWriteSummary, DomainError> {
        let conn = self.connection()?;
        let properties = serde_json::to_string(write.properties())
            .map_err(|e| DomainError::internal(format!("Failed to encode properties: {}", e)))?;

        let existing: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM graph_nodes WHERE id = ?1",
                params![write.key()],
                |row| row.get(0),
            )
            .map_err(|e| DomainError::storage(format!("Failed to look up node: {}", e)))?;

        conn.execute(
            r#"
            INSERT INTO graph_nodes (id, label, properties)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (id) DO UPDATE SET
                label = excluded.label,
                properties = excluded.properties
            "#,
            params![write.key(), write.label(), properties],
        )
        .map_err(|e| DomainError::storage(format!("Failed to merge node: {}", e)))?;

        Ok(GraphWriteSummary {
            nodes_created: u64::from(existing == 0),
            properties_set: write.properties().len() as u64,
        })
    }

    async fn node_exists(&mut self, label: &str, id: &str) -> Result<bool, DomainError> {
        let conn = self.connection()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM graph_nodes WHERE id = ?1 AND label = ?2",
                params![id, label],
                |row| row.get(0),
            )
            .map_err(|e| DomainError::storage(format!("Failed to look up node: {}", e)))?;
        Ok(count > 0)
    }

    async fn count_nodes(&mut self, label: Option<&str>) -> Result<u64, DomainError> {
        let conn = self.connection()?;
        let count: i64 = match label {
            Some(label) => conn.query_row(
                "SELECT COUNT(*) FROM graph_nodes WHERE label = ?1",
                params![label],
                |row| row.get(0),
            ),
            None => conn.query_row("SELECT COUNT(*) FROM graph_nodes", [], |row| row.get(0)),
        }
        .map_err(|e| DomainError::storage(format!("Failed to count nodes: {}", e)))?;
        Ok(count as u64)
    }

    async fn close(mut self: Box<Self>) -> Result<(), DomainError> {
        match self.conn.take() {
            Some(conn) => conn
                .close()
                .map_err(|(_, e)| DomainError::storage(format!("Failed to close graph session: {}", e))),
            None => Ok(()),
        }
    }
}

impl Drop for DuckdbGraphSession {
    fn drop(&mut self) {
        if self.conn.take().is_some() {
            warn!("Graph session dropped without close; connection released");
        }
    }
}
