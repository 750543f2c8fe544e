use serde::{Deserialize, Serialize};

use super::{EntityType, RelationalRow};

/// Independent switches for a single persist call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistOptions {
    pub skip_graph: bool,
    pub skip_vector: bool,
    pub skip_async: bool,
    /// Only lowers per-step log lines to debug; never changes behaviour.
    pub batch_mode: bool,
}

impl PersistOptions {
    pub fn relational_only() -> Self {
        Self {
            skip_graph: true,
            skip_vector: true,
            skip_async: true,
            batch_mode: false,
        }
    }

    pub fn in_batch(self) -> Self {
        Self {
            batch_mode: true,
            ..self
        }
    }
}

/// The stores (and the job queue) a persist call fans out to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    Relational,
    Graph,
    Vector,
    Queue,
}

impl StoreKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::Relational => "relational",
            StoreKind::Graph => "graph",
            StoreKind::Vector => "vector",
            StoreKind::Queue => "async",
        }
    }

    fn operation(&self) -> &'static str {
        match self {
            StoreKind::Queue => "enqueue",
            _ => "write",
        }
    }

    /// `"graph write failed for Concept c1: <reason>"`.
    pub fn describe_failure(
        &self,
        entity_type: impl std::fmt::Display,
        entity_id: &str,
        reason: impl std::fmt::Display,
    ) -> String {
        format!(
            "{} {} failed for {} {}: {}",
            self.as_str(),
            self.operation(),
            entity_type,
            entity_id,
            reason
        )
    }
}

impl std::fmt::Display for StoreKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of persisting one entity.
///
/// `success` is true exactly when the relational write committed; graph,
/// vector and queue failures only add entries to `errors`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistenceResult {
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub relational: Option<RelationalRow>,
    pub graph: Option<String>,
    pub vector: Option<String>,
    pub success: bool,
    pub async_queued: bool,
    pub errors: Vec<String>,
}

impl PersistenceResult {
    pub fn committed(row: RelationalRow) -> Self {
        Self {
            entity_type: row.entity_type.as_str().to_string(),
            entity_id: Some(row.id.clone()),
            relational: Some(row),
            graph: None,
            vector: None,
            success: true,
            async_queued: false,
            errors: Vec::new(),
        }
    }

    pub fn aborted(
        entity_type: impl Into<String>,
        entity_id: Option<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            entity_id,
            relational: None,
            graph: None,
            vector: None,
            success: false,
            async_queued: false,
            errors: vec![error.into()],
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Summary of a batch persist. Results and errors are in completion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchPersistenceResult {
    pub results: Vec<PersistenceResult>,
    pub total_processed: usize,
    pub total_successful: usize,
    pub total_failed: usize,
    pub errors: Vec<String>,
}

impl BatchPersistenceResult {
    pub fn record(&mut self, result: PersistenceResult) {
        self.total_processed += 1;
        if result.success {
            self.total_successful += 1;
        } else {
            self.total_failed += 1;
        }
        self.errors.extend(result.errors.iter().cloned());
        self.results.push(result);
    }
}

/// Outcome of a reconciliation sweep over the secondary stores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconcileReport {
    pub scanned: usize,
    pub graph_repaired: usize,
    pub vector_repaired: usize,
    pub errors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_failure_names_store_type_and_id() {
        assert_eq!(
            StoreKind::Graph.describe_failure(EntityType::Concept, "c1", "connection refused"),
            "graph write failed for Concept c1: connection refused"
        );
        assert_eq!(
            StoreKind::Queue.describe_failure(EntityType::MemoryUnit, "m1", "closed"),
            "async enqueue failed for MemoryUnit m1: closed"
        );
    }

    #[test]
    fn test_batch_record_keeps_counts_consistent() {
        let mut batch = BatchPersistenceResult::default();
        batch.record(PersistenceResult::aborted("Concept", None, "boom"));
        batch.record(PersistenceResult::aborted("Concept", None, "bang"));

        assert_eq!(batch.total_processed, 2);
        assert_eq!(batch.total_failed, 2);
        assert_eq!(batch.total_successful, 0);
        assert_eq!(batch.errors, vec!["boom".to_string(), "bang".to_string()]);
    }

    #[test]
    fn test_in_batch_only_flips_logging_switch() {
        let options = PersistOptions::relational_only().in_batch();
        assert!(options.batch_mode);
        assert!(options.skip_graph && options.skip_vector && options.skip_async);
    }
}
