pub mod persist_controller;
pub mod reconcile_controller;
pub mod stats_controller;

pub use persist_controller::PersistController;
pub use reconcile_controller::ReconcileController;
pub use stats_controller::StatsController;
