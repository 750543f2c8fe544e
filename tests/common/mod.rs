#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use entity_fanout::application::{GraphClient, GraphSession};
use entity_fanout::domain::{
    DomainError, EntityRecord, EntityType, GraphWrite, GraphWriteSummary, JobHandle, JobPayload,
    RelationalRow, VectorItem,
};
use entity_fanout::{
    EntityRepository, InMemoryEntityRepository, InMemoryGraphStore, InMemoryJobQueue,
    InMemoryVectorIndex, JobQueue, PersistEntityUseCase, PersistenceConfig, StandardizedEntity,
    VectorIndex,
};

/// Relational store double counting creates, tracking peak concurrency, and
/// optionally panicking on one title.
pub struct CountingRepository {
    inner: InMemoryEntityRepository,
    creates: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delay: Option<Duration>,
    panic_on_title: Option<String>,
    fail_with: Option<String>,
}

impl CountingRepository {
    pub fn new() -> Self {
        Self {
            inner: InMemoryEntityRepository::new(),
            creates: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            delay: None,
            panic_on_title: None,
            fail_with: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn panicking_on(mut self, title: &str) -> Self {
        self.panic_on_title = Some(title.to_string());
        self
    }

    pub fn failing(mut self, reason: &str) -> Self {
        self.fail_with = Some(reason.to_string());
        self
    }

    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub async fn record(&self, id: &str) -> Option<EntityRecord> {
        self.inner.record(id).await
    }
}

#[async_trait]
impl EntityRepository for CountingRepository {
    async fn create(&self, record: &EntityRecord) -> Result<RelationalRow, DomainError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.panic_on_title.as_deref() == Some(record.core().title.as_str()) {
            panic!("relational driver crashed");
        }
        if let Some(reason) = &self.fail_with {
            return Err(DomainError::storage(reason.clone()));
        }
        self.inner.create(record).await
    }

    async fn find_by_id(
        &self,
        entity_type: EntityType,
        id: &str,
    ) -> Result<Option<RelationalRow>, DomainError> {
        self.inner.find_by_id(entity_type, id).await
    }

    async fn list(
        &self,
        entity_type: EntityType,
        user_id: Option<&str>,
    ) -> Result<Vec<RelationalRow>, DomainError> {
        self.inner.list(entity_type, user_id).await
    }

    async fn count(&self, entity_type: EntityType) -> Result<u64, DomainError> {
        self.inner.count(entity_type).await
    }
}

/// Graph client whose sessions cannot be opened.
pub struct UnreachableGraph {
    attempts: AtomicUsize,
}

impl UnreachableGraph {
    pub fn new() -> Self {
        Self {
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GraphClient for UnreachableGraph {
    async fn open_session(&self) -> Result<Box<dyn GraphSession>, DomainError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(DomainError::unavailable("connection refused"))
    }
}

/// Graph client whose writes hang for `delay`; tracks live and closed sessions.
pub struct StalledGraph {
    delay: Duration,
    live: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
}

impl StalledGraph {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            live: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn live_sessions(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    pub fn closed_sessions(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GraphClient for StalledGraph {
    async fn open_session(&self) -> Result<Box<dyn GraphSession>, DomainError> {
        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(StalledSession {
            delay: self.delay,
            live: Arc::clone(&self.live),
            closed: Arc::clone(&self.closed),
        }))
    }
}

struct StalledSession {
    delay: Duration,
    live: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
}

#[async_trait]
impl GraphSession for StalledSession {
    async fn execute(&mut self, _write: &GraphWrite) -> Result<GraphWriteSummary, DomainError> {
        tokio::time::sleep(self.delay).await;
        Ok(GraphWriteSummary::default())
    }

    async fn node_exists(&mut self, _label: &str, _id: &str) -> Result<bool, DomainError> {
        Ok(false)
    }

    async fn count_nodes(&mut self, _label: Option<&str>) -> Result<u64, DomainError> {
        Ok(0)
    }

    async fn close(self: Box<Self>) -> Result<(), DomainError> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl Drop for StalledSession {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Vector index double that counts upserts and can be built to fail or stall.
pub struct CountingVectorIndex {
    inner: InMemoryVectorIndex,
    upserts: AtomicUsize,
    delay: Option<Duration>,
    fail_with: Option<String>,
}

impl CountingVectorIndex {
    pub fn new() -> Self {
        Self {
            inner: InMemoryVectorIndex::new(),
            upserts: AtomicUsize::new(0),
            delay: None,
            fail_with: None,
        }
    }

    pub fn stalled(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new()
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            fail_with: Some(reason.to_string()),
            ..Self::new()
        }
    }

    pub fn upserts(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VectorIndex for CountingVectorIndex {
    async fn upsert(&self, items: &[VectorItem]) -> Result<usize, DomainError> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(reason) = &self.fail_with {
            return Err(DomainError::storage(reason.clone()));
        }
        self.inner.upsert(items).await
    }

    async fn get(&self, id: &str) -> Result<Option<VectorItem>, DomainError> {
        self.inner.get(id).await
    }

    async fn count(&self) -> Result<u64, DomainError> {
        self.inner.count().await
    }
}

/// Job queue that rejects every enqueue.
pub struct ClosedQueue;

#[async_trait]
impl JobQueue for ClosedQueue {
    async fn enqueue(&self, _name: &str, _payload: &JobPayload) -> Result<JobHandle, DomainError> {
        Err(DomainError::unavailable("queue is closed"))
    }

    async fn pending_count(&self) -> Result<u64, DomainError> {
        Ok(0)
    }
}

/// Job queue whose enqueue hangs for `delay` before accepting the job.
pub struct StalledQueue {
    inner: InMemoryJobQueue,
    delay: Duration,
}

impl StalledQueue {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: InMemoryJobQueue::new(),
            delay,
        }
    }

    pub async fn jobs(&self) -> usize {
        self.inner.jobs().await.len()
    }
}

#[async_trait]
impl JobQueue for StalledQueue {
    async fn enqueue(&self, name: &str, payload: &JobPayload) -> Result<JobHandle, DomainError> {
        tokio::time::sleep(self.delay).await;
        self.inner.enqueue(name, payload).await
    }

    async fn pending_count(&self) -> Result<u64, DomainError> {
        self.inner.pending_count().await
    }
}

/// The four stores wired into a [`PersistEntityUseCase`], all healthy by default.
pub struct Harness {
    pub repo: Arc<CountingRepository>,
    pub graph: Arc<InMemoryGraphStore>,
    pub vector: Arc<CountingVectorIndex>,
    pub queue: Arc<InMemoryJobQueue>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_repo(CountingRepository::new())
    }

    pub fn with_repo(repo: CountingRepository) -> Self {
        Self {
            repo: Arc::new(repo),
            graph: Arc::new(InMemoryGraphStore::new()),
            vector: Arc::new(CountingVectorIndex::new()),
            queue: Arc::new(InMemoryJobQueue::new()),
        }
    }

    pub fn use_case(&self) -> PersistEntityUseCase {
        self.use_case_with(PersistenceConfig::default())
    }

    pub fn use_case_with(&self, config: PersistenceConfig) -> PersistEntityUseCase {
        PersistEntityUseCase::new(
            self.repo.clone(),
            Some(self.graph.clone()),
            self.vector.clone(),
            self.queue.clone(),
            &config,
        )
    }

    pub async fn enqueued(&self) -> usize {
        self.queue.jobs().await.len()
    }
}

pub const T0: i64 = 1_700_000_000;

pub fn travel_concept() -> StandardizedEntity {
    StandardizedEntity::new("u1", "Travel", "Notes about trips")
        .with_id("c1")
        .with_subtype("topic")
        .with_status("active")
        .with_created_at(T0)
}
