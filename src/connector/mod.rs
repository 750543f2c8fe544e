//! # Connector Layer
//!
//! Store implementations behind the application ports (DuckDB and in-memory),
//! plus the container and controllers wiring them to the CLI.

pub mod adapter;
pub mod api;

pub use adapter::*;
pub use api::{Container, ContainerConfig, Router};
