use std::time::Duration;

pub const DEFAULT_BATCH_CONCURRENCY: usize = 16;

/// Tunables for the fan-out pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistenceConfig {
    pub relational_timeout: Duration,
    pub graph_timeout: Duration,
    pub vector_timeout: Duration,
    pub queue_timeout: Duration,
    /// Upper bound on entities persisted at once by a batch; `0` lifts the bound.
    pub batch_concurrency: usize,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            relational_timeout: Duration::from_secs(10),
            graph_timeout: Duration::from_secs(5),
            vector_timeout: Duration::from_secs(5),
            queue_timeout: Duration::from_secs(2),
            batch_concurrency: DEFAULT_BATCH_CONCURRENCY,
        }
    }
}

impl PersistenceConfig {
    pub fn with_batch_concurrency(mut self, batch_concurrency: usize) -> Self {
        self.batch_concurrency = batch_concurrency;
        self
    }

    pub fn with_timeouts(
        mut self,
        relational: Duration,
        graph: Duration,
        vector: Duration,
        queue: Duration,
    ) -> Self {
        self.relational_timeout = relational;
        self.graph_timeout = graph;
        self.vector_timeout = vector;
        self.queue_timeout = queue;
        self
    }

    /// Caps `batch_concurrency` at `ceiling`, including the unbounded `0`.
    pub fn with_concurrency_ceiling(mut self, ceiling: usize) -> Self {
        if self.batch_concurrency == 0 || self.batch_concurrency > ceiling {
            self.batch_concurrency = ceiling.max(1);
        }
        self
    }

    /// Effective concurrency for a batch of `len` entities.
    pub fn concurrency_for(&self, len: usize) -> usize {
        let cap = if self.batch_concurrency == 0 {
            len
        } else {
            self.batch_concurrency.min(len)
        };
        cap.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concurrency_for_respects_cap() {
        let config = PersistenceConfig::default().with_batch_concurrency(4);
        assert_eq!(config.concurrency_for(100), 4);
        assert_eq!(config.concurrency_for(2), 2);
        assert_eq!(config.concurrency_for(0), 1);
    }

    #[test]
    fn test_zero_concurrency_means_unbounded() {
        let config = PersistenceConfig::default().with_batch_concurrency(0);
        assert_eq!(config.concurrency_for(1000), 1000);
    }

    #[test]
    fn test_concurrency_ceiling_bounds_unbounded_and_large_caps() {
        let unbounded = PersistenceConfig::default()
            .with_batch_concurrency(0)
            .with_concurrency_ceiling(16);
        assert_eq!(unbounded.batch_concurrency, 16);
        assert_eq!(unbounded.concurrency_for(300), 16);

        let large = PersistenceConfig::default()
            .with_batch_concurrency(64)
            .with_concurrency_ceiling(16);
        assert_eq!(large.batch_concurrency, 16);

        let small = PersistenceConfig::default()
            .with_batch_concurrency(4)
            .with_concurrency_ceiling(16);
        assert_eq!(small.batch_concurrency, 4);
    }
}
