use async_trait::async_trait;

use crate::domain::{DomainError, VectorItem};

/// Vector-search store holding the narrow entity projection.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Idempotent upsert of one or many items keyed by `id`. An existing item
    /// is replaced as a whole. Returns the number of items written.
    async fn upsert(&self, items: &[VectorItem]) -> Result<usize, DomainError>;

    async fn get(&self, id: &str) -> Result<Option<VectorItem>, DomainError>;

    async fn count(&self) -> Result<u64, DomainError>;
}
