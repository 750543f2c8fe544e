//! # Domain Layer
//!
//! Entity models, store projections, and the error type.
//! This layer is independent of any store or runtime.

mod error;
pub mod models;

pub use error::*;
pub use models::*;
