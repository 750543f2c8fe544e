use anyhow::Result;

use crate::application::StoreStats;

use super::super::Container;

pub struct StatsController<'a> {
    container: &'a Container,
}

impl<'a> StatsController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn stats(&self) -> Result<String> {
        let use_case = self.container.store_stats_use_case();
        let stats = use_case.execute().await?;
        Ok(self.format_stats(&stats))
    }

    fn format_stats(&self, stats: &StoreStats) -> String {
        let mut output = String::from("Entity Fan-out Statistics\n=========================\n");
        for (entity_type, count) in &stats.entities {
            output.push_str(&format!("{:<22} {}\n", entity_type.as_str(), count));
        }

        let graph_nodes = stats
            .graph_nodes
            .map(|count| count.to_string())
            .unwrap_or_else(|| "unavailable".to_string());
        let data_dir = if self.container.memory_storage() {
            "(in-memory)"
        } else {
            self.container.data_dir()
        };

        output.push_str(&format!(
            "\nTotal Entities: {}\nGraph Nodes:    {}\nVector Items:   {}\nPending Jobs:   {}\nData Dir:       {}",
            stats.total_entities(),
            graph_nodes,
            stats.vector_items,
            stats.pending_jobs,
            data_dir
        ));
        output
    }
}
