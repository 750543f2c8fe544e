use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::application::EntityRepository;
use crate::domain::{current_timestamp, DomainError, EntityRecord, EntityType, RelationalRow};

/// Relational store kept in process memory; rows are keyed by identifier.
pub struct InMemoryEntityRepository {
    rows: Arc<Mutex<HashMap<String, (RelationalRow, EntityRecord)>>>,
}

impl InMemoryEntityRepository {
    pub fn new() -> Self {
        Self {
            rows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// The stored record, including its variant-specific fields.
    pub async fn record(&self, id: &str) -> Option<EntityRecord> {
        let rows = self.rows.lock().await;
        rows.get(id).map(|(_, record)| record.clone())
    }
}

impl Default for InMemoryEntityRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EntityRepository for InMemoryEntityRepository {
    async fn create(&self, record: &EntityRecord) -> Result<RelationalRow, DomainError> {
        let core = record.core();
        let id = core
            .id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let created_at = core.created_at.unwrap_or_else(current_timestamp);

        let mut rows = self.rows.lock().await;
        if rows.contains_key(&id) {
            return Err(DomainError::already_exists(format!(
                "entity with id {} already exists",
                id
            )));
        }

        let row = RelationalRow::assigned(record, id.clone(), created_at);
        rows.insert(id, (row.clone(), record.clone()));

        debug!("Created {} {} in memory", row.entity_type, row.id);
        Ok(row)
    }

    async fn find_by_id(
        &self,
        entity_type: EntityType,
        id: &str,
    ) -> Result<Option<RelationalRow>, DomainError> {
        let rows = self.rows.lock().await;
        Ok(rows
            .get(id)
            .filter(|(row, _)| row.entity_type == entity_type)
            .map(|(row, _)| row.clone()))
    }

    async fn list(
        &self,
        entity_type: EntityType,
        user_id: Option<&str>,
    ) -> Result<Vec<RelationalRow>, DomainError> {
        let rows = self.rows.lock().await;
        let mut matching: Vec<RelationalRow> = rows
            .values()
            .map(|(row, _)| row)
            .filter(|row| row.entity_type == entity_type)
            .filter(|row| user_id.map_or(true, |user| row.user_id == user))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(matching)
    }

    async fn count(&self, entity_type: EntityType) -> Result<u64, DomainError> {
        let rows = self.rows.lock().await;
        Ok(rows
            .values()
            .filter(|(row, _)| row.entity_type == entity_type)
            .count() as u64)
    }
}
