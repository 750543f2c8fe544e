use async_trait::async_trait;

use crate::domain::{DomainError, JobHandle, JobPayload};

/// Hands follow-up work to an asynchronous job system. No delivery or
/// ordering guarantee is assumed beyond `enqueue` returning a handle.
#[async_trait]
pub trait JobQueue: Send + Sync {
    async fn enqueue(&self, name: &str, payload: &JobPayload) -> Result<JobHandle, DomainError>;

    async fn pending_count(&self) -> Result<u64, DomainError>;
}
