use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, warn};

use crate::application::{
    EntityRepository, GraphClient, JobQueue, PersistBatchUseCase, PersistEntityUseCase,
    PersistenceConfig, ReconcileUseCase, StoreStatsUseCase, VectorIndex,
};
use crate::connector::adapter::{
    DuckdbEntityRepository, DuckdbGraphStore, DuckdbJobQueue, DuckdbVectorIndex,
    InMemoryEntityRepository, InMemoryGraphStore, InMemoryJobQueue, InMemoryVectorIndex,
};

pub const DATABASE_FILE: &str = "entities.duckdb";

/// Batch ceiling when every store shares one DuckDB connection. Each store
/// deadline also covers the wait for that connection, so an unbounded batch
/// would time out healthy stores.
pub const DUCKDB_MAX_BATCH_CONCURRENCY: usize = 16;

pub struct ContainerConfig {
    pub data_dir: String,
    /// Keep every store in process memory; nothing is written to `data_dir`.
    pub memory_storage: bool,
    /// Run without a graph client. Graph steps then fail as tolerated errors.
    pub disable_graph: bool,
    pub persistence: PersistenceConfig,
}

pub struct Container {
    entity_repo: Arc<dyn EntityRepository>,
    graph_client: Option<Arc<dyn GraphClient>>,
    vector_index: Arc<dyn VectorIndex>,
    job_queue: Arc<dyn JobQueue>,
    persist_entity: Arc<PersistEntityUseCase>,
    config: ContainerConfig,
}

impl Container {
    pub async fn new(mut config: ContainerConfig) -> Result<Self> {
        let (entity_repo, graph_client, vector_index, job_queue): (
            Arc<dyn EntityRepository>,
            Arc<dyn GraphClient>,
            Arc<dyn VectorIndex>,
            Arc<dyn JobQueue>,
        ) = if config.memory_storage {
            debug!("Using in-memory stores");
            (
                Arc::new(InMemoryEntityRepository::new()),
                Arc::new(InMemoryGraphStore::new()),
                Arc::new(InMemoryVectorIndex::new()),
                Arc::new(InMemoryJobQueue::new()),
            )
        } else {
            let db_path = PathBuf::from(&config.data_dir).join(DATABASE_FILE);
            debug!("Using DuckDB stores at {:?}", db_path);

            let requested = config.persistence.batch_concurrency;
            config.persistence = config
                .persistence
                .clone()
                .with_concurrency_ceiling(DUCKDB_MAX_BATCH_CONCURRENCY);
            if config.persistence.batch_concurrency != requested {
                warn!(
                    "Batch concurrency {} lowered to {} for the shared DuckDB connection",
                    requested, config.persistence.batch_concurrency
                );
            }

            // One connection shared by every store; DuckDB allows a single writer per file.
            let entity_repo = DuckdbEntityRepository::new(&db_path)?;
            let shared_conn = entity_repo.shared_connection();
            let graph = DuckdbGraphStore::with_connection(Arc::clone(&shared_conn)).await?;
            let vector = DuckdbVectorIndex::with_connection(Arc::clone(&shared_conn)).await?;
            let queue = DuckdbJobQueue::with_connection(shared_conn).await?;
            (
                Arc::new(entity_repo),
                Arc::new(graph),
                Arc::new(vector),
                Arc::new(queue),
            )
        };

        let graph_client = if config.disable_graph {
            debug!("Graph client disabled");
            None
        } else {
            Some(graph_client)
        };

        let persist_entity = Arc::new(PersistEntityUseCase::new(
            Arc::clone(&entity_repo),
            graph_client.clone(),
            Arc::clone(&vector_index),
            Arc::clone(&job_queue),
            &config.persistence,
        ));

        Ok(Self {
            entity_repo,
            graph_client,
            vector_index,
            job_queue,
            persist_entity,
            config,
        })
    }

    pub fn persist_entity_use_case(&self) -> Arc<PersistEntityUseCase> {
        Arc::clone(&self.persist_entity)
    }

    pub fn persist_batch_use_case(&self) -> PersistBatchUseCase {
        PersistBatchUseCase::new(
            Arc::clone(&self.persist_entity),
            self.config.persistence.clone(),
        )
    }

    pub fn reconcile_use_case(&self) -> ReconcileUseCase {
        ReconcileUseCase::new(
            self.entity_repo.clone(),
            self.graph_client.clone(),
            self.vector_index.clone(),
            &self.config.persistence,
        )
    }

    pub fn store_stats_use_case(&self) -> StoreStatsUseCase {
        StoreStatsUseCase::new(
            self.entity_repo.clone(),
            self.graph_client.clone(),
            self.vector_index.clone(),
            self.job_queue.clone(),
            &self.config.persistence,
        )
    }

    pub fn data_dir(&self) -> &str {
        &self.config.data_dir
    }

    pub fn memory_storage(&self) -> bool {
        self.config.memory_storage
    }
}
