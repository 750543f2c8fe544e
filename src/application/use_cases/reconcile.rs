use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::application::{
    EntityRepository, GraphClient, GraphWriter, PersistenceConfig, RelationalWriter, VectorIndex,
    VectorWriter,
};
use crate::domain::{EntityType, ReconcileReport, RelationalRow, StoreKind};

/// Repairs graph and vector projections that fell behind the relational
/// store after tolerated failures.
///
/// Rows are read from the system of record and re-upserted into whichever
/// secondary store is missing them. Upserts are idempotent, so a sweep can be
/// re-run at any time.
pub struct ReconcileUseCase {
    relational: RelationalWriter,
    graph: GraphWriter,
    vector: VectorWriter,
}

impl ReconcileUseCase {
    pub fn new(
        entity_repo: Arc<dyn EntityRepository>,
        graph_client: Option<Arc<dyn GraphClient>>,
        vector_index: Arc<dyn VectorIndex>,
        config: &PersistenceConfig,
    ) -> Self {
        Self {
            relational: RelationalWriter::new(entity_repo, config.relational_timeout),
            graph: GraphWriter::new(graph_client, config.graph_timeout),
            vector: VectorWriter::new(vector_index, config.vector_timeout),
        }
    }

    pub async fn execute(
        &self,
        entity_types: &[EntityType],
        user_id: Option<&str>,
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        if !self.graph.is_configured() {
            warn!("No graph client configured; reconciling the vector store only");
        }

        for entity_type in entity_types {
            let rows = match self.relational.list(*entity_type, user_id).await {
                Ok(rows) => rows,
                Err(e) => {
                    let reason = format!("failed to list {} rows: {}", entity_type, e);
                    warn!("{}", reason);
                    report.errors.push(reason);
                    continue;
                }
            };

            debug!("Reconciling {} {} row(s)", rows.len(), entity_type);
            for row in &rows {
                report.scanned += 1;
                if self.graph.is_configured() && self.repair_graph(row, &mut report).await {
                    report.graph_repaired += 1;
                }
                if self.repair_vector(row, &mut report).await {
                    report.vector_repaired += 1;
                }
            }
        }

        info!(
            "Reconciliation complete: {} scanned, {} graph and {} vector projection(s) repaired, {} error(s)",
            report.scanned,
            report.graph_repaired,
            report.vector_repaired,
            report.errors.len()
        );

        report
    }

    /// Returns true when a missing node was written back.
    async fn repair_graph(&self, row: &RelationalRow, report: &mut ReconcileReport) -> bool {
        let outcome = match self.graph.contains(row).await {
            Ok(true) => return false,
            Ok(false) => self.graph.write(row).await.map(|_| ()),
            Err(e) => Err(e),
        };
        record(outcome, StoreKind::Graph, row, report)
    }

    async fn repair_vector(&self, row: &RelationalRow, report: &mut ReconcileReport) -> bool {
        let outcome = match self.vector.contains(&row.id).await {
            Ok(true) => return false,
            Ok(false) => self.vector.write(row).await.map(|_| ()),
            Err(e) => Err(e),
        };
        record(outcome, StoreKind::Vector, row, report)
    }
}

fn record(
    outcome: Result<(), crate::domain::DomainError>,
    store: StoreKind,
    row: &RelationalRow,
    report: &mut ReconcileReport,
) -> bool {
    match outcome {
        Ok(()) => {
            debug!("Restored {} projection for {} {}", store, row.entity_type, row.id);
            true
        }
        Err(e) => {
            let reason = store.describe_failure(row.entity_type, &row.id, e);
            warn!("{}", reason);
            report.errors.push(reason);
            false
        }
    }
}
