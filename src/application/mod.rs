//! # Application Layer
//!
//! Store ports, per-store writers, and the use cases orchestrating them.

mod config;
pub mod interfaces;
pub mod use_cases;
pub mod writers;

pub use config::*;
pub use interfaces::*;
pub use use_cases::*;
pub use writers::*;
