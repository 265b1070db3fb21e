//! Repository trait definitions for lottery storage.
//!
//! The store is split into two focused traits:
//!
//! - [`registration`]: the pool of registrants per draw window
//! - [`draw`]: winners/reserves per draw window and the atomic draw itself
//!
//! # Trait Composition
//!
//! For functions that need both, use the [`FullRepository`] trait bound:
//!
//! ```ignore
//! async fn my_service<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<()> {
//!     let pending = repo.count_registrations_for_window(window).await?;
//!     let drawn = repo.count_results_for_window(window).await?;
//!     Ok(())
//! }
//! ```

pub mod draw;
pub mod error;
pub mod registration;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

pub use draw::{plan_results, DrawRepository, PlannedResults};
pub use registration::RegistrationRepository;

/// Composite trait bound for a complete repository implementation.
pub trait FullRepository: RegistrationRepository + DrawRepository {}

impl<T> FullRepository for T where T: RegistrationRepository + DrawRepository {}
