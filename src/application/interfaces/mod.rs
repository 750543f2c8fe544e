mod entity_repository;
mod graph_client;
mod job_queue;
mod vector_index;

pub use entity_repository::*;
pub use graph_client::*;
pub use job_queue::*;
pub use vector_index::*;
