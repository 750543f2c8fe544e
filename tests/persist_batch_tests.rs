mod common;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use common::{Harness, CountingRepository, UnreachableGraph};
use entity_fanout::{
    EntityType, EntityWriteRequest, PersistBatchUseCase, PersistEntityUseCase, PersistOptions,
    PersistenceConfig, StandardizedEntity,
};

fn requests(n: usize) -> Vec<EntityWriteRequest> {
    (0..n)
        .map(|i| {
            let entity_type = EntityType::ALL[i % EntityType::ALL.len()];
            EntityWriteRequest::typed(
                entity_type,
                StandardizedEntity::new("u1", format!("entity {}", i), "body").with_id(format!("e{}", i)),
            )
        })
        .collect()
}

fn batch_for(harness: &Harness, config: PersistenceConfig) -> PersistBatchUseCase {
    PersistBatchUseCase::new(Arc::new(harness.use_case_with(config.clone())), config)
}

#[tokio::test]
async fn batch_conserves_counts_for_any_size() {
    for n in [0usize, 1, 7, 250] {
        let harness = Harness::new();
        let batch = batch_for(&harness, PersistenceConfig::default());

        let summary = batch.execute(requests(n), &PersistOptions::default()).await;

        assert_eq!(summary.total_processed, n);
        assert_eq!(summary.total_successful + summary.total_failed, n);
        assert_eq!(summary.total_successful, n);
        assert_eq!(summary.results.len(), n);
        assert!(summary.errors.is_empty());
        assert_eq!(harness.repo.creates(), n);
        assert_eq!(harness.enqueued().await, n);
    }
}

#[tokio::test]
async fn empty_batch_resolves_with_zero_summary() {
    let harness = Harness::new();
    let batch = batch_for(&harness, PersistenceConfig::default());

    let summary = batch.execute(Vec::new(), &PersistOptions::default()).await;

    assert_eq!(summary.total_processed, 0);
    assert!(summary.results.is_empty());
}

#[tokio::test]
async fn panicking_entity_fails_alone() {
    let harness = Harness::with_repo(CountingRepository::new().panicking_on("entity 3"));
    let batch = batch_for(&harness, PersistenceConfig::default());

    let summary = batch.execute(requests(6), &PersistOptions::default()).await;

    assert_eq!(summary.total_processed, 6);
    assert_eq!(summary.total_successful, 5);
    assert_eq!(summary.total_failed, 1);
    assert_eq!(summary.errors.len(), 1);
    assert!(summary.errors[0].starts_with("batch item 3 ("));
    assert!(summary.errors[0].contains("e3"));

    let failed = summary
        .results
        .iter()
        .find(|r| !r.success)
        .expect("failed result");
    assert_eq!(failed.entity_id.as_deref(), Some("e3"));
}

#[tokio::test]
async fn mixed_batch_concatenates_errors_and_counts_failures() {
    let harness = Harness::new();
    let batch = batch_for(&harness, PersistenceConfig::default());

    let mut input = requests(3);
    input.push(EntityWriteRequest::new(
        "Widget",
        StandardizedEntity::new("u1", "bad", "").with_id("w1"),
    ));

    let summary = batch.execute(input, &PersistOptions::default()).await;

    assert_eq!(summary.total_processed, 4);
    assert_eq!(summary.total_successful, 3);
    assert_eq!(summary.total_failed, 1);
    assert_eq!(summary.errors.len(), 1);
    assert!(summary.errors[0].contains("Unsupported entity type 'Widget'"));
}

#[tokio::test]
async fn tolerated_failures_from_every_entity_are_collected() {
    let harness = Harness::new();
    let use_case = PersistEntityUseCase::new(
        harness.repo.clone(),
        Some(Arc::new(UnreachableGraph::new())),
        harness.vector.clone(),
        harness.queue.clone(),
        &PersistenceConfig::default(),
    );
    let batch = PersistBatchUseCase::new(Arc::new(use_case), PersistenceConfig::default());

    let summary = batch.execute(requests(5), &PersistOptions::default()).await;

    assert_eq!(summary.total_successful, 5);
    assert_eq!(summary.total_failed, 0);
    assert_eq!(summary.errors.len(), 5);
    assert!(summary.errors.iter().all(|e| e.starts_with("graph write failed for")));

    let named: HashSet<_> = summary
        .errors
        .iter()
        .filter_map(|e| e.split(':').next())
        .filter_map(|head| head.rsplit(' ').next())
        .collect();
    assert_eq!(named.len(), 5);
}

#[tokio::test]
async fn concurrency_cap_bounds_in_flight_writes() {
    let harness =
        Harness::with_repo(CountingRepository::new().with_delay(Duration::from_millis(20)));
    let config = PersistenceConfig::default().with_batch_concurrency(3);
    let batch = batch_for(&harness, config);

    let summary = batch
        .execute(requests(12), &PersistOptions::relational_only())
        .await;

    assert_eq!(summary.total_successful, 12);
    assert!(harness.repo.max_in_flight() <= 3);
    assert!(harness.repo.max_in_flight() >= 1);
}

#[tokio::test]
async fn unbounded_batch_launches_everything_together() {
    let harness =
        Harness::with_repo(CountingRepository::new().with_delay(Duration::from_millis(50)));
    let config = PersistenceConfig::default().with_batch_concurrency(0);
    let batch = batch_for(&harness, config);

    let summary = batch
        .execute(requests(8), &PersistOptions::relational_only())
        .await;

    assert_eq!(summary.total_successful, 8);
    assert_eq!(harness.repo.max_in_flight(), 8);
}
