use std::sync::Arc;
use std::time::Duration;

use super::with_timeout;
use crate::application::VectorIndex;
use crate::domain::{DomainError, RelationalRow, StoreKind, VectorItem};

/// Rebuilds the narrow vector projection and upserts it whole.
pub struct VectorWriter {
    index: Arc<dyn VectorIndex>,
    timeout: Duration,
}

impl VectorWriter {
    pub fn new(index: Arc<dyn VectorIndex>, timeout: Duration) -> Self {
        Self { index, timeout }
    }

    /// Returns the identifier of the upserted item.
    pub async fn write(&self, row: &RelationalRow) -> Result<String, DomainError> {
        let item = VectorItem::from(row);
        let written = with_timeout(
            StoreKind::Vector,
            self.timeout,
            self.index.upsert(std::slice::from_ref(&item)),
        )
        .await?;

        if written == 0 {
            return Err(DomainError::storage(format!(
                "vector store acknowledged no items for {}",
                item.id
            )));
        }
        Ok(item.id)
    }

    pub async fn contains(&self, id: &str) -> Result<bool, DomainError> {
        with_timeout(StoreKind::Vector, self.timeout, self.index.get(id))
            .await
            .map(|item| item.is_some())
    }
}
