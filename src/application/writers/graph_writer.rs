use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::with_timeout;
use crate::application::{GraphClient, GraphSession};
use crate::domain::{DomainError, GraphWrite, RelationalRow, StoreKind};

/// Upserts the generic entity node into the graph store, one session per call.
pub struct GraphWriter {
    client: Option<Arc<dyn GraphClient>>,
    timeout: Duration,
}

impl GraphWriter {
    pub fn new(client: Option<Arc<dyn GraphClient>>, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Returns the identifier of the upserted node.
    pub async fn write(&self, row: &RelationalRow) -> Result<String, DomainError> {
        let write = GraphWrite::entity_node(row);
        let mut session = self.open_session().await?;

        debug!(cypher = %write.cypher(), id = %row.id, "Running graph upsert");
        let outcome = with_timeout(StoreKind::Graph, self.timeout, session.execute(&write)).await;
        Self::release(session).await;

        let summary = outcome?;
        debug!(
            "Graph upsert for {} {} created {} node(s), set {} properties",
            row.entity_type, row.id, summary.nodes_created, summary.properties_set
        );
        Ok(row.id.clone())
    }

    pub async fn contains(&self, row: &RelationalRow) -> Result<bool, DomainError> {
        let mut session = self.open_session().await?;
        let outcome = with_timeout(
            StoreKind::Graph,
            self.timeout,
            session.node_exists(row.entity_type.as_str(), &row.id),
        )
        .await;
        Self::release(session).await;
        outcome
    }

    pub async fn count_nodes(&self) -> Result<u64, DomainError> {
        let mut session = self.open_session().await?;
        let outcome = with_timeout(StoreKind::Graph, self.timeout, session.count_nodes(None)).await;
        Self::release(session).await;
        outcome
    }

    async fn open_session(&self) -> Result<Box<dyn GraphSession>, DomainError> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| DomainError::unavailable("graph client is not configured"))?;
        with_timeout(StoreKind::Graph, self.timeout, client.open_session()).await
    }

    async fn release(session: Box<dyn GraphSession>) {
        if let Err(e) = session.close().await {
            warn!("Failed to close graph session: {}", e);
        }
    }
}
