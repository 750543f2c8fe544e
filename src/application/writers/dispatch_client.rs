use std::sync::Arc;
use std::time::Duration;

use super::with_timeout;
use crate::application::JobQueue;
use crate::domain::{DomainError, JobHandle, JobPayload, RelationalRow, StoreKind, FOLLOW_UP_JOB};

/// Enqueues the follow-up job (embedding generation, graph projection) for a
/// freshly persisted entity. Fire-and-forget: only the enqueue call is observed.
pub struct DispatchClient {
    queue: Arc<dyn JobQueue>,
    timeout: Duration,
}

impl DispatchClient {
    pub fn new(queue: Arc<dyn JobQueue>, timeout: Duration) -> Self {
        Self { queue, timeout }
    }

    pub async fn dispatch(&self, row: &RelationalRow) -> Result<JobHandle, DomainError> {
        let payload = JobPayload::from(row);
        with_timeout(
            StoreKind::Queue,
            self.timeout,
            self.queue.enqueue(FOLLOW_UP_JOB, &payload),
        )
        .await
    }
}
