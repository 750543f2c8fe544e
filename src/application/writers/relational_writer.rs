use std::sync::Arc;
use std::time::Duration;

use super::with_timeout;
use crate::application::EntityRepository;
use crate::domain::{
    DomainError, EntityRecord, EntityType, RelationalRow, StandardizedEntity, StoreKind,
};

/// Writes the variant-specific relational shape of an entity.
pub struct RelationalWriter {
    repository: Arc<dyn EntityRepository>,
    timeout: Duration,
}

impl RelationalWriter {
    pub fn new(repository: Arc<dyn EntityRepository>, timeout: Duration) -> Self {
        Self {
            repository,
            timeout,
        }
    }

    pub async fn write(
        &self,
        entity_type: EntityType,
        entity: StandardizedEntity,
    ) -> Result<RelationalRow, DomainError> {
        let record = EntityRecord::project(entity_type, entity);
        with_timeout(
            StoreKind::Relational,
            self.timeout,
            self.repository.create(&record),
        )
        .await
    }

    pub async fn list(
        &self,
        entity_type: EntityType,
        user_id: Option<&str>,
    ) -> Result<Vec<RelationalRow>, DomainError> {
        with_timeout(
            StoreKind::Relational,
            self.timeout,
            self.repository.list(entity_type, user_id),
        )
        .await
    }
}
