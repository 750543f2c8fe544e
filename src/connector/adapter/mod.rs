mod duckdb_entity_repository;
mod duckdb_graph_store;
mod duckdb_job_queue;
mod duckdb_vector_index;
mod in_memory_entity_repository;
mod in_memory_graph_store;
mod in_memory_job_queue;
mod in_memory_vector_index;

pub use duckdb_entity_repository::*;
pub use duckdb_graph_store::*;
pub use duckdb_job_queue::*;
pub use duckdb_vector_index::*;
pub use in_memory_entity_repository::*;
pub use in_memory_graph_store::*;
pub use in_memory_job_queue::*;
pub use in_memory_vector_index::*;
