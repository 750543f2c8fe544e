use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::application::JobQueue;
use crate::domain::{DomainError, JobHandle, JobPayload};

/// A job accepted by [`InMemoryJobQueue`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedJob {
    pub handle: JobHandle,
    pub name: String,
    pub payload: JobPayload,
}

/// Records enqueued jobs in order; nothing consumes them.
pub struct InMemoryJobQueue {
    jobs: Arc<Mutex<Vec<QueuedJob>>>,
}

impl InMemoryJobQueue {
    pub fn new() -> Self {
        Self {
            jobs: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn jobs(&self) -> Vec<QueuedJob> {
        self.jobs.lock().await.clone()
    }
}

impl Default for InMemoryJobQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobQueue for InMemoryJobQueue {
    async fn enqueue(&self, name: &str, payload: &JobPayload) -> Result<JobHandle, DomainError> {
        let handle = JobHandle {
            id: Uuid::new_v4().to_string(),
        };

        self.jobs.lock().await.push(QueuedJob {
            handle: handle.clone(),
            name: name.to_string(),
            payload: payload.clone(),
        });

        debug!("Queued {} for {} {}", name, payload.entity_type, payload.entity_id);
        Ok(handle)
    }

    async fn pending_count(&self) -> Result<u64, DomainError> {
        Ok(self.jobs.lock().await.len() as u64)
    }
}
