//! In-memory local repository implementation.
//!
//! All data lives behind a single `RwLock`, which makes every operation,
//! including the multi-step draw, atomic with respect to other callers.
//! Suitable for unit tests, local development and single-process deployments
//! that can afford to lose state on restart.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::db::repository::*;
use crate::models::{
    DrawCategory, DrawOutcome, DrawResult, DrawSelector, DrawSummary, DrawWindow, NewDrawResult,
    NewRegistrant, Registrant,
};

/// In-memory local repository.
///
/// # Example
/// ```
/// use gym_lottery::db::repositories::LocalRepository;
///
/// let repo = LocalRepository::new();
/// assert_eq!(repo.registration_count(), 0);
/// assert_eq!(repo.result_count(), 0);
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    registrations: BTreeMap<i64, Registrant>,
    results: BTreeMap<i64, DrawResult>,
    drawn_windows: BTreeSet<DrawWindow>,

    next_registration_id: i64,
    next_result_id: i64,

    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            registrations: BTreeMap::new(),
            results: BTreeMap::new(),
            drawn_windows: BTreeSet::new(),
            next_registration_id: 1,
            next_result_id: 1,
            is_healthy: true,
        }
    }
}

impl LocalData {
    fn push_result(&mut self, result: &NewDrawResult) -> DrawResult {
        let id = self.next_result_id;
        self.next_result_id += 1;
        let stored = DrawResult {
            id,
            student_id: result.student_id.clone(),
            first_name: result.first_name.clone(),
            last_name: result.last_name.clone(),
            draw_window: result.draw_window,
            category: result.category,
        };
        self.results.insert(id, stored.clone());
        stored
    }

    fn registrations_for(&self, window: DrawWindow) -> impl Iterator<Item = &Registrant> {
        self.registrations
            .values()
            .filter(move |r| r.draw_window == window)
    }

    fn results_for(&self, window: DrawWindow) -> impl Iterator<Item = &DrawResult> {
        self.results.values().filter(move |r| r.draw_window == window)
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Clear all data from the repository.
    pub fn clear(&self) {
        let mut data = self.data.write();
        *data = LocalData {
            is_healthy: data.is_healthy,
            ..Default::default()
        };
    }

    /// Number of registrations stored across all windows.
    pub fn registration_count(&self) -> usize {
        self.data.read().registrations.len()
    }

    /// Number of results stored across all windows.
    pub fn result_count(&self) -> usize {
        self.data.read().results.len()
    }

    /// Whether a draw has been recorded for `window`.
    pub fn is_drawn(&self, window: DrawWindow) -> bool {
        self.data.read().drawn_windows.contains(&window)
    }

    fn unavailable(operation: &str) -> RepositoryError {
        RepositoryError::connection_with_context(
            "Database is not healthy",
            ErrorContext::new(operation),
        )
    }

    /// Helper to check health and return error if unhealthy.
    fn check_health(&self, operation: &str) -> RepositoryResult<()> {
        if !self.data.read().is_healthy {
            return Err(Self::unavailable(operation));
        }
        Ok(())
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RegistrationRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn insert_registration(&self, registrant: &NewRegistrant) -> RepositoryResult<Registrant> {
        let mut data = self.data.write();
        if !data.is_healthy {
            return Err(Self::unavailable("insert_registration"));
        }

        let duplicate = data
            .registrations_for(registrant.draw_window)
            .any(|r| r.student_id == registrant.student_id);
        if duplicate {
            return Err(RepositoryError::conflict_with_context(
                "student is already registered for this draw window",
                ErrorContext::new("insert_registration")
                    .with_entity("registration")
                    .with_entity_id(&registrant.student_id)
                    .with_details(format!("draw_time={}", registrant.draw_window.epoch_seconds())),
            ));
        }

        let id = data.next_registration_id;
        data.next_registration_id += 1;
        let stored = Registrant {
            id,
            student_id: registrant.student_id.clone(),
            first_name: registrant.first_name.clone(),
            last_name: registrant.last_name.clone(),
            phone: registrant.phone.clone(),
            // Persisted as epoch seconds elsewhere; keep the same precision here.
            registered_at: DateTime::from_timestamp(registrant.registered_at.timestamp(), 0)
                .unwrap_or(registrant.registered_at),
            draw_window: registrant.draw_window,
        };
        data.registrations.insert(id, stored.clone());
        Ok(stored)
    }

    async fn count_registrations_for_window(&self, window: DrawWindow) -> RepositoryResult<u64> {
        self.check_health("count_registrations_for_window")?;
        Ok(self.data.read().registrations_for(window).count() as u64)
    }

    async fn fetch_registrations_for_window(
        &self,
        window: DrawWindow,
    ) -> RepositoryResult<Vec<Registrant>> {
        self.check_health("fetch_registrations_for_window")?;
        let mut rows: Vec<Registrant> = self
            .data
            .read()
            .registrations_for(window)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.registered_at.cmp(&a.registered_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn fetch_all_registrations(&self) -> RepositoryResult<Vec<Registrant>> {
        self.check_health("fetch_all_registrations")?;
        Ok(self.data.read().registrations.values().cloned().collect())
    }

    async fn delete_registrations_for_window(&self, window: DrawWindow) -> RepositoryResult<u64> {
        let mut data = self.data.write();
        if !data.is_healthy {
            return Err(Self::unavailable("delete_registrations_for_window"));
        }
        let before = data.registrations.len();
        data.registrations.retain(|_, r| r.draw_window != window);
        Ok((before - data.registrations.len()) as u64)
    }

    async fn delete_registrations(&self, ids: &[i64]) -> RepositoryResult<u64> {
        let mut data = self.data.write();
        if !data.is_healthy {
            return Err(Self::unavailable("delete_registrations"));
        }
        let removed = ids
            .iter()
            .filter(|&&id| data.registrations.remove(&id).is_some())
            .count();
        Ok(removed as u64)
    }
}

#[async_trait]
impl DrawRepository for LocalRepository {
    async fn insert_result(&self, result: &NewDrawResult) -> RepositoryResult<DrawResult> {
        let mut data = self.data.write();
        if !data.is_healthy {
            return Err(Self::unavailable("insert_result"));
        }
        let duplicate = data
            .results_for(result.draw_window)
            .any(|r| r.student_id == result.student_id);
        if duplicate {
            return Err(RepositoryError::conflict_with_context(
                "student already has a result for this draw window",
                ErrorContext::new("insert_result")
                    .with_entity("result")
                    .with_entity_id(&result.student_id),
            ));
        }
        Ok(data.push_result(result))
    }

    async fn count_results_for_window(&self, window: DrawWindow) -> RepositoryResult<u64> {
        self.check_health("count_results_for_window")?;
        Ok(self.data.read().results_for(window).count() as u64)
    }

    async fn fetch_results_for_window(
        &self,
        window: DrawWindow,
        category: DrawCategory,
    ) -> RepositoryResult<Vec<DrawResult>> {
        self.check_health("fetch_results_for_window")?;
        Ok(self
            .data
            .read()
            .results_for(window)
            .filter(|r| r.category == category)
            .cloned()
            .collect())
    }

    async fn fetch_all_results(&self) -> RepositoryResult<Vec<DrawResult>> {
        self.check_health("fetch_all_results")?;
        Ok(self.data.read().results.values().cloned().collect())
    }

    async fn delete_result(&self, id: i64) -> RepositoryResult<u64> {
        let mut data = self.data.write();
        if !data.is_healthy {
            return Err(Self::unavailable("delete_result"));
        }
        Ok(u64::from(data.results.remove(&id).is_some()))
    }

    async fn execute_draw(
        &self,
        window: DrawWindow,
        _drawn_at: DateTime<Utc>,
        selector: DrawSelector,
    ) -> RepositoryResult<DrawOutcome> {
        // The write guard is held for the whole draw; nothing below awaits.
        let mut data = self.data.write();
        if !data.is_healthy {
            return Err(Self::unavailable("execute_draw"));
        }

        let pool: Vec<Registrant> = data.registrations_for(window).cloned().collect();
        if pool.is_empty() {
            return Ok(DrawOutcome::NoRegistrations { window });
        }
        if data.drawn_windows.contains(&window) || data.results_for(window).next().is_some() {
            return Ok(DrawOutcome::AlreadyDrawn { window });
        }

        // Everything fallible happens before the first mutation.
        let selection = selector.select(pool.len());
        let planned = plan_results(&pool, &selection, window)?;

        let winners = planned.winners.iter().map(|r| data.push_result(r)).collect();
        let reserves = planned.reserves.iter().map(|r| data.push_result(r)).collect();
        data.registrations.retain(|_, r| r.draw_window != window);
        data.drawn_windows.insert(window);

        Ok(DrawOutcome::Drawn(DrawSummary {
            window,
            winners,
            reserves,
            discarded: pool.len() - planned.len(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DrawCaps;

    fn window(seconds: i64) -> DrawWindow {
        DrawWindow::from_epoch_seconds(seconds).unwrap()
    }

    fn new_registrant(student_id: &str, window: DrawWindow, at: i64) -> NewRegistrant {
        NewRegistrant {
            student_id: student_id.to_string(),
            first_name: "Ana".to_string(),
            last_name: "Pop".to_string(),
            phone: "0700000000".to_string(),
            registered_at: DateTime::from_timestamp(at, 0).unwrap(),
            draw_window: window,
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let repo = LocalRepository::new();
        let w = window(1_000_000);
        let a = repo.insert_registration(&new_registrant("S1", w, 10)).await.unwrap();
        let b = repo.insert_registration(&new_registrant("S2", w, 11)).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
    }

    #[tokio::test]
    async fn test_same_student_allowed_in_different_windows() {
        let repo = LocalRepository::new();
        repo.insert_registration(&new_registrant("S1", window(1_000), 1))
            .await
            .unwrap();
        repo.insert_registration(&new_registrant("S1", window(2_000), 2))
            .await
            .unwrap();
        assert_eq!(repo.registration_count(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_is_conflict() {
        let repo = LocalRepository::new();
        let w = window(1_000);
        repo.insert_registration(&new_registrant("S1", w, 1)).await.unwrap();
        let err = repo
            .insert_registration(&new_registrant("S1", w, 2))
            .await
            .unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(repo.registration_count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_orders_newest_first() {
        let repo = LocalRepository::new();
        let w = window(1_000);
        repo.insert_registration(&new_registrant("S1", w, 5)).await.unwrap();
        repo.insert_registration(&new_registrant("S2", w, 9)).await.unwrap();
        repo.insert_registration(&new_registrant("S3", w, 7)).await.unwrap();

        let ids: Vec<String> = repo
            .fetch_registrations_for_window(w)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.student_id)
            .collect();
        assert_eq!(ids, vec!["S2", "S3", "S1"]);
    }

    #[tokio::test]
    async fn test_delete_registrations_skips_unknown_ids() {
        let repo = LocalRepository::new();
        let w = window(1_000);
        for i in 0..3 {
            repo.insert_registration(&new_registrant(&format!("S{}", i), w, i))
                .await
                .unwrap();
        }
        assert_eq!(repo.delete_registrations(&[1, 3, 42, 3]).await.unwrap(), 2);
        let left = repo.fetch_registrations_for_window(w).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, 2);
    }

    #[tokio::test]
    async fn test_execute_draw_bad_selector_leaves_store_untouched() {
        let repo = LocalRepository::new();
        let w = window(1_000);
        for i in 0..3 {
            repo.insert_registration(&new_registrant(&format!("S{}", i), w, i))
                .await
                .unwrap();
        }
        let selector = DrawSelector::from_fn(|_| crate::models::DrawSelection {
            winners: vec![0, 0],
            reserves: vec![],
        });

        assert!(repo
            .execute_draw(w, DateTime::from_timestamp(2_000, 0).unwrap(), selector)
            .await
            .is_err());
        assert_eq!(repo.registration_count(), 3);
        assert_eq!(repo.result_count(), 0);
        assert!(!repo.is_drawn(w));
    }

    #[tokio::test]
    async fn test_execute_draw_marks_window() {
        let repo = LocalRepository::new();
        let w = window(1_000);
        repo.insert_registration(&new_registrant("S1", w, 1)).await.unwrap();

        let outcome = repo
            .execute_draw(
                w,
                DateTime::from_timestamp(2_000, 0).unwrap(),
                DrawSelector::seeded(DrawCaps::default(), 1),
            )
            .await
            .unwrap();

        assert!(outcome.is_drawn());
        assert!(repo.is_drawn(w));
        assert_eq!(repo.registration_count(), 0);
    }

    #[tokio::test]
    async fn test_unhealthy_repository_errors() {
        let repo = LocalRepository::new();
        repo.set_healthy(false);

        let err = repo.count_registrations_for_window(window(1)).await.unwrap_err();
        assert!(err.is_retryable());
        assert!(err.to_string().contains("count_registrations_for_window"));
        assert!(!repo.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_clear_keeps_health_flag() {
        let repo = LocalRepository::new();
        repo.insert_registration(&new_registrant("S1", window(1), 1)).await.unwrap();
        repo.set_healthy(false);
        repo.clear();
        assert_eq!(repo.registration_count(), 0);
        assert!(!repo.health_check().await.unwrap());
    }
}
