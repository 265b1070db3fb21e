//! Registration pool repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{DrawWindow, NewRegistrant, Registrant};

/// Storage for the per-window pool of registrants.
///
/// Implementations must enforce uniqueness of (student id, draw window) on
/// insert, not merely offer a way to pre-check it.
#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    /// Check if the store is reachable.
    ///
    /// # Returns
    /// - `Ok(true)` if the connection is healthy
    /// - `Ok(false)` if it is unhealthy but no error occurred
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Insert a registrant and return it with its assigned id.
    ///
    /// # Returns
    /// * `Err(RepositoryError::ConflictError)` - The student is already registered for that window
    async fn insert_registration(&self, registrant: &NewRegistrant) -> RepositoryResult<Registrant>;

    async fn count_registrations_for_window(&self, window: DrawWindow) -> RepositoryResult<u64>;

    /// All registrants for a window, most recent registration first.
    async fn fetch_registrations_for_window(
        &self,
        window: DrawWindow,
    ) -> RepositoryResult<Vec<Registrant>>;

    /// Every registrant in the store regardless of window, ordered by id.
    async fn fetch_all_registrations(&self) -> RepositoryResult<Vec<Registrant>>;

    /// Remove every registrant for a window. Returns the number removed.
    async fn delete_registrations_for_window(&self, window: DrawWindow) -> RepositoryResult<u64>;

    /// Remove the registrants with the given ids as one unit: on error none
    /// are removed. Unknown ids are skipped. Returns the number removed.
    async fn delete_registrations(&self, ids: &[i64]) -> RepositoryResult<u64>;
}
