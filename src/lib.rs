pub mod application;
pub mod cli;
pub mod connector;
pub mod domain;

pub use application::{
    EntityRepository, GraphClient, GraphSession, JobQueue, PersistBatchUseCase,
    PersistEntityUseCase, PersistenceConfig, ReconcileUseCase, StoreStatsUseCase, VectorIndex,
};

pub use cli::Commands;

pub use connector::{
    Container, ContainerConfig, DuckdbEntityRepository, DuckdbGraphStore, DuckdbJobQueue,
    DuckdbVectorIndex, InMemoryEntityRepository, InMemoryGraphStore, InMemoryJobQueue,
    InMemoryVectorIndex, Router,
};

pub use domain::{
    BatchPersistenceResult, DomainError, EntityType, EntityWriteRequest, PersistOptions,
    PersistenceResult, ReconcileReport, StandardizedEntity,
};
