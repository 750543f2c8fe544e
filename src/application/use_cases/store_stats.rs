use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::application::{EntityRepository, GraphClient, GraphWriter, JobQueue, VectorIndex};
use crate::domain::{DomainError, EntityType};

/// Row and item counts across every store.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StoreStats {
    pub entities: Vec<(EntityType, u64)>,
    /// `None` when no graph client is configured or the graph is unreachable.
    pub graph_nodes: Option<u64>,
    pub vector_items: u64,
    pub pending_jobs: u64,
}

impl StoreStats {
    pub fn total_entities(&self) -> u64 {
        self.entities.iter().map(|(_, count)| count).sum()
    }
}

pub struct StoreStatsUseCase {
    entity_repo: Arc<dyn EntityRepository>,
    graph: GraphWriter,
    vector_index: Arc<dyn VectorIndex>,
    job_queue: Arc<dyn JobQueue>,
}

impl StoreStatsUseCase {
    pub fn new(
        entity_repo: Arc<dyn EntityRepository>,
        graph_client: Option<Arc<dyn GraphClient>>,
        vector_index: Arc<dyn VectorIndex>,
        job_queue: Arc<dyn JobQueue>,
        config: &crate::application::PersistenceConfig,
    ) -> Self {
        Self {
            entity_repo,
            graph: GraphWriter::new(graph_client, config.graph_timeout),
            vector_index,
            job_queue,
        }
    }

    pub async fn execute(&self) -> Result<StoreStats, DomainError> {
        let mut entities = Vec::with_capacity(EntityType::ALL.len());
        for entity_type in EntityType::ALL {
            entities.push((entity_type, self.entity_repo.count(entity_type).await?));
        }

        let graph_nodes = if self.graph.is_configured() {
            match self.graph.count_nodes().await {
                Ok(count) => Some(count),
                Err(e) => {
                    warn!("Could not count graph nodes: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Ok(StoreStats {
            entities,
            graph_nodes,
            vector_items: self.vector_index.count().await?,
            pending_jobs: self.job_queue.pending_count().await?,
        })
    }
}
