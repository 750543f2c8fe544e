use std::path::Path;

use anyhow::{Context, Result};

use crate::domain::{EntityWriteRequest, PersistOptions};

use super::super::Container;

pub struct PersistController<'a> {
    container: &'a Container,
}

impl<'a> PersistController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    /// Persists the single `{ "type": .., "data": .. }` request held in `file`.
    pub async fn persist(&self, file: &Path, options: PersistOptions) -> Result<String> {
        let request: EntityWriteRequest = read_json(file).await?;
        let use_case = self.container.persist_entity_use_case();
        let result = use_case
            .execute(&request.entity_type, request.data, &options)
            .await;
        Ok(serde_json::to_string_pretty(&result)?)
    }

    /// Persists every request of the JSON array held in `file`.
    pub async fn batch(&self, file: &Path, options: PersistOptions) -> Result<String> {
        let requests: Vec<EntityWriteRequest> = read_json(file).await?;
        let use_case = self.container.persist_batch_use_case();
        let summary = use_case.execute(requests, &options).await;
        Ok(serde_json::to_string_pretty(&summary)?)
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(file: &Path) -> Result<T> {
    let raw = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid request JSON in {}", file.display()))
}
