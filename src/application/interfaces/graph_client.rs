use async_trait::async_trait;

use crate::domain::{DomainError, GraphWrite, GraphWriteSummary};

/// Entry point to a property-graph store. Every write runs in its own
/// session; sessions are never shared between concurrent writes.
#[async_trait]
pub trait GraphClient: Send + Sync {
    async fn open_session(&self) -> Result<Box<dyn GraphSession>, DomainError>;
}

/// A short-lived unit of work against the graph store.
///
/// Callers must `close` the session once done. Implementations also release
/// their resources on drop so a cancelled future cannot leak a session.
#[async_trait]
pub trait GraphSession: Send {
    async fn execute(&mut self, write: &GraphWrite) -> Result<GraphWriteSummary, DomainError>;

    async fn node_exists(&mut self, label: &str, id: &str) -> Result<bool, DomainError>;

    async fn count_nodes(&mut self, label: Option<&str>) -> Result<u64, DomainError>;

    async fn close(self: Box<Self>) -> Result<(), DomainError>;
}
