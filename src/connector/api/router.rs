use anyhow::Result;

use crate::Commands;

use super::container::Container;
use super::controller::{PersistController, ReconcileController, StatsController};

pub struct Router<'a> {
    persist_controller: PersistController<'a>,
    reconcile_controller: ReconcileController<'a>,
    stats_controller: StatsController<'a>,
}

impl<'a> Router<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self {
            persist_controller: PersistController::new(container),
            reconcile_controller: ReconcileController::new(container),
            stats_controller: StatsController::new(container),
        }
    }

    pub async fn route(&self, command: Commands) -> Result<String> {
        match command {
            Commands::Persist { file, skip } => {
                self.persist_controller.persist(&file, skip.options()).await
            }
            Commands::Batch { file, skip } => {
                self.persist_controller.batch(&file, skip.options()).await
            }
            Commands::Reconcile { user, entity_type } => {
                self.reconcile_controller.reconcile(user, entity_type).await
            }
            Commands::Stats => self.stats_controller.stats().await,
        }
    }
}
