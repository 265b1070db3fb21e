//! Storage for registrations and draw results.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  HTTP layer (axum handlers)                              │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Services: registration, weekly draw, admin, overview    │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository traits (repository/)                         │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!      ┌──────────────┴───────────────┐
//!      │                              │
//!  LocalRepository             PostgresRepository
//!   (in-memory)            (Diesel, `postgres-repo`)
//! ```
//!
//! Use [`RepositoryFactory`] to build a backend from the environment or from
//! `lottery.toml`, or [`init_repository`] for the process-wide instance.

#[cfg(not(any(feature = "postgres-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;

#[cfg(feature = "postgres-repo")]
pub use repositories::postgres::PostgresConfig;

pub use factory::{RepositoryFactory, RepositoryType};
pub use repo_config::{find_config_file, RepositoryConfig};
pub use repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use repositories::PostgresRepository;
pub use repository::{
    DrawRepository, ErrorContext, FullRepository, RegistrationRepository, RepositoryError,
    RepositoryResult,
};

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Global repository instance initialized once per process.
static REPOSITORY: OnceCell<Arc<dyn FullRepository>> = OnceCell::const_new();

/// Initialize the global repository from `lottery.toml` and the environment.
///
/// Calling it again after a successful initialization is a no-op.
pub async fn init_repository() -> Result<&'static Arc<dyn FullRepository>> {
    REPOSITORY
        .get_or_try_init(|| async {
            let config = RepositoryConfig::load().context("Failed to load repository config")?;
            let repo = RepositoryFactory::from_repository_config(&config)
                .await
                .context("Failed to create repository")?;
            Ok::<_, anyhow::Error>(repo)
        })
        .await
}
