use std::sync::Arc;
use std::time::Instant;

use futures_util::stream::{self, StreamExt};
use tracing::{error, info};

use super::PersistEntityUseCase;
use crate::application::PersistenceConfig;
use crate::domain::{BatchPersistenceResult, EntityWriteRequest, PersistOptions, PersistenceResult};

/// Persists many entities concurrently through [`PersistEntityUseCase`].
///
/// Each entity runs in its own task, at most `batch_concurrency` at a time.
/// A task that dies (panics) becomes a failed result for that entity only;
/// the batch itself always resolves with a summary.
pub struct PersistBatchUseCase {
    persist_entity: Arc<PersistEntityUseCase>,
    config: PersistenceConfig,
}

impl PersistBatchUseCase {
    pub fn new(persist_entity: Arc<PersistEntityUseCase>, config: PersistenceConfig) -> Self {
        Self {
            persist_entity,
            config,
        }
    }

    pub async fn execute(
        &self,
        requests: Vec<EntityWriteRequest>,
        options: &PersistOptions,
    ) -> BatchPersistenceResult {
        let total = requests.len();
        let concurrency = self.config.concurrency_for(total);
        let options = options.in_batch();
        let start_time = Instant::now();

        info!(
            "Persisting batch of {} entities (concurrency {})",
            total, concurrency
        );

        let mut summary = BatchPersistenceResult::default();
        let mut completions = stream::iter(requests.into_iter().enumerate())
            .map(|(index, request)| {
                let persist_entity = Arc::clone(&self.persist_entity);
                let entity_type = request.entity_type.clone();
                let entity_id = request.data.id.clone();
                async move {
                    let task = tokio::spawn(async move {
                        persist_entity
                            .execute(&request.entity_type, request.data, &options)
                            .await
                    });
                    match task.await {
                        Ok(result) => result,
                        Err(e) => {
                            let reason = format!(
                                "batch item {} ({} {}) aborted: {}",
                                index,
                                entity_type,
                                entity_id.as_deref().unwrap_or("<unassigned>"),
                                e
                            );
                            error!("{}", reason);
                            PersistenceResult::aborted(entity_type, entity_id, reason)
                        }
                    }
                }
            })
            .buffer_unordered(concurrency);

        while let Some(result) = completions.next().await {
            summary.record(result);
        }

        info!(
            "Batch complete: {} processed, {} successful, {} failed in {:.2}s",
            summary.total_processed,
            summary.total_successful,
            summary.total_failed,
            start_time.elapsed().as_secs_f64()
        );

        summary
    }
}
