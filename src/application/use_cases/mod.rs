mod persist_batch;
mod persist_entity;
mod reconcile;
mod store_stats;

pub use persist_batch::*;
pub use persist_entity::*;
pub use reconcile::*;
pub use store_stats::*;
