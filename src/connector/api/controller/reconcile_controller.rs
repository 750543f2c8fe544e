use anyhow::Result;

use crate::domain::EntityType;

use super::super::Container;

pub struct ReconcileController<'a> {
    container: &'a Container,
}

impl<'a> ReconcileController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    /// Sweeps the given types, or all of them when none are named.
    pub async fn reconcile(
        &self,
        user: Option<String>,
        entity_types: Vec<EntityType>,
    ) -> Result<String> {
        let entity_types = if entity_types.is_empty() {
            EntityType::ALL.to_vec()
        } else {
            entity_types
        };

        let use_case = self.container.reconcile_use_case();
        let report = use_case.execute(&entity_types, user.as_deref()).await;
        Ok(serde_json::to_string_pretty(&report)?)
    }
}
