use async_trait::async_trait;

use crate::domain::{DomainError, EntityRecord, EntityType, RelationalRow};

/// The relational system of record.
#[async_trait]
pub trait EntityRepository: Send + Sync {
    /// Inserts the record into its variant's table, assigning the identifier
    /// and creation timestamp when the record carries none. An identifier that
    /// already exists is rejected with [`DomainError::AlreadyExists`].
    async fn create(&self, record: &EntityRecord) -> Result<RelationalRow, DomainError>;

    async fn find_by_id(
        &self,
        entity_type: EntityType,
        id: &str,
    ) -> Result<Option<RelationalRow>, DomainError>;

    /// Lists rows of one entity type, optionally restricted to a tenant.
    async fn list(
        &self,
        entity_type: EntityType,
        user_id: Option<&str>,
    ) -> Result<Vec<RelationalRow>, DomainError>;

    async fn count(&self, entity_type: EntityType) -> Result<u64, DomainError>;
}
