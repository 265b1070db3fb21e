//! Repository implementations.
//!
//! - `local`: in-memory store for tests and single-process deployments
//! - `postgres`: Diesel-backed store with migrations and pooled connections
pub mod local;
#[cfg(feature = "postgres-repo")]
pub mod postgres;

pub use local::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use postgres::{PostgresConfig, PostgresRepository};
