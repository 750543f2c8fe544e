use std::sync::Arc;

use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::application::{
    DispatchClient, EntityRepository, GraphClient, GraphWriter, JobQueue, PersistenceConfig,
    RelationalWriter, VectorIndex, VectorWriter,
};
use crate::domain::{
    EntityType, PersistOptions, PersistenceResult, StandardizedEntity, StoreKind,
};

/// Drives one entity through relational, graph, vector and async hand-off,
/// strictly in that order.
///
/// The relational store is the source of truth: its failure aborts the call
/// with `success = false`. Graph, vector and queue failures are recorded in
/// `errors` and never undo the relational write.
pub struct PersistEntityUseCase {
    relational: RelationalWriter,
    graph: GraphWriter,
    vector: VectorWriter,
    dispatch: DispatchClient,
}

impl PersistEntityUseCase {
    pub fn new(
        entity_repo: Arc<dyn EntityRepository>,
        graph_client: Option<Arc<dyn GraphClient>>,
        vector_index: Arc<dyn VectorIndex>,
        job_queue: Arc<dyn JobQueue>,
        config: &PersistenceConfig,
    ) -> Self {
        Self {
            relational: RelationalWriter::new(entity_repo, config.relational_timeout),
            graph: GraphWriter::new(graph_client, config.graph_timeout),
            vector: VectorWriter::new(vector_index, config.vector_timeout),
            dispatch: DispatchClient::new(job_queue, config.queue_timeout),
        }
    }

    /// Persists an entity whose type is given by name. An unknown name aborts
    /// before any store is touched.
    pub async fn execute(
        &self,
        entity_type: &str,
        entity: StandardizedEntity,
        options: &PersistOptions,
    ) -> PersistenceResult {
        match EntityType::parse(entity_type) {
            Ok(entity_type) => self.execute_typed(entity_type, entity, options).await,
            Err(e) => {
                error!("Rejected entity {}: {}", entity.display_id(), e);
                PersistenceResult::aborted(
                    entity_type,
                    entity.id.clone(),
                    format!("relational write failed: {}", e),
                )
            }
        }
    }

    pub async fn execute_typed(
        &self,
        entity_type: EntityType,
        entity: StandardizedEntity,
        options: &PersistOptions,
    ) -> PersistenceResult {
        let span = info_span!(
            "persist_entity",
            entity_type = %entity_type,
            entity_id = %entity.display_id(),
        );
        self.run(entity_type, entity, options).instrument(span).await
    }

    async fn run(
        &self,
        entity_type: EntityType,
        entity: StandardizedEntity,
        options: &PersistOptions,
    ) -> PersistenceResult {
        let requested_id = entity.id.clone();

        if let Err(e) = entity.validate() {
            let reason =
                StoreKind::Relational.describe_failure(entity_type, entity.display_id(), &e);
            error!("{}", reason);
            return PersistenceResult::aborted(entity_type.as_str(), requested_id, reason);
        }

        // 1. Relational: required, the only abort-class step.
        let display_id = entity.display_id().to_string();
        let row = match self.relational.write(entity_type, entity).await {
            Ok(row) => row,
            Err(e) => {
                let reason = StoreKind::Relational.describe_failure(entity_type, &display_id, &e);
                error!("{}", reason);
                return PersistenceResult::aborted(entity_type.as_str(), requested_id, reason);
            }
        };
        log_step(options, StoreKind::Relational, &row.id);

        let mut result = PersistenceResult::committed(row.clone());

        // 2. Graph
        if !options.skip_graph {
            match self.graph.write(&row).await {
                Ok(node_id) => {
                    log_step(options, StoreKind::Graph, &node_id);
                    result.graph = Some(node_id);
                }
                Err(e) => tolerate(&mut result, StoreKind::Graph, entity_type, &row.id, e),
            }
        }

        // 3. Vector
        if !options.skip_vector {
            match self.vector.write(&row).await {
                Ok(item_id) => {
                    log_step(options, StoreKind::Vector, &item_id);
                    result.vector = Some(item_id);
                }
                Err(e) => tolerate(&mut result, StoreKind::Vector, entity_type, &row.id, e),
            }
        }

        // 4. Async hand-off
        if !options.skip_async {
            match self.dispatch.dispatch(&row).await {
                Ok(handle) => {
                    log_step(options, StoreKind::Queue, &handle.id);
                    result.async_queued = true;
                }
                Err(e) => tolerate(&mut result, StoreKind::Queue, entity_type, &row.id, e),
            }
        }

        if result.has_errors() {
            warn!(
                "Persisted {} {} with {} tolerated failure(s)",
                entity_type,
                row.id,
                result.errors.len()
            );
        } else if options.batch_mode {
            debug!("Persisted {} {}", entity_type, row.id);
        } else {
            info!("Persisted {} {}", entity_type, row.id);
        }

        result
    }
}

fn tolerate(
    result: &mut PersistenceResult,
    store: StoreKind,
    entity_type: EntityType,
    entity_id: &str,
    error: impl std::fmt::Display,
) {
    let reason = store.describe_failure(entity_type, entity_id, error);
    warn!("{}", reason);
    result.errors.push(reason);
}

fn log_step(options: &PersistOptions, store: StoreKind, reference: &str) {
    if options.batch_mode {
        debug!("{} step completed ({})", store, reference);
    } else {
        info!("{} step completed ({})", store, reference);
    }
}
