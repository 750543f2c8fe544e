//! Per-store adapters translating an entity into each store's native write.

mod dispatch_client;
mod graph_writer;
mod relational_writer;
mod vector_writer;

pub use dispatch_client::*;
pub use graph_writer::*;
pub use relational_writer::*;
pub use vector_writer::*;

use std::future::Future;
use std::time::Duration;

use crate::domain::{DomainError, StoreKind};

/// Bounds a store call; an elapsed deadline becomes [`DomainError::Timeout`].
pub(crate) async fn with_timeout<T, F>(
    store: StoreKind,
    limit: Duration,
    call: F,
) -> Result<T, DomainError>
where
    F: Future<Output = Result<T, DomainError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(DomainError::timeout(format!(
            "{} store did not respond within {}ms",
            store,
            limit.as_millis()
        ))),
    }
}
