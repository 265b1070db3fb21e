//! Draw results repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;

use super::error::{ErrorContext, RepositoryError, RepositoryResult};
use crate::models::{
    DrawCategory, DrawOutcome, DrawResult, DrawSelection, DrawSelector, DrawWindow, NewDrawResult,
    Registrant,
};

#[async_trait]
pub trait DrawRepository: Send + Sync {
    async fn insert_result(&self, result: &NewDrawResult) -> RepositoryResult<DrawResult>;

    async fn count_results_for_window(&self, window: DrawWindow) -> RepositoryResult<u64>;

    /// Results of one category for a window, in insertion order.
    async fn fetch_results_for_window(
        &self,
        window: DrawWindow,
        category: DrawCategory,
    ) -> RepositoryResult<Vec<DrawResult>>;

    /// Every result in the store, ordered by id.
    async fn fetch_all_results(&self) -> RepositoryResult<Vec<DrawResult>>;

    /// Remove a single result by id. Returns the number removed (0 or 1).
    async fn delete_result(&self, id: i64) -> RepositoryResult<u64>;

    /// Run the draw for `window` as one atomic unit.
    ///
    /// Under a guard scoped to the window, implementations must:
    /// 1. load the window's registrants (none: [`DrawOutcome::NoRegistrations`]),
    /// 2. detect a draw that already happened ([`DrawOutcome::AlreadyDrawn`]),
    /// 3. let `selector` pick winners and reserves by pool position,
    /// 4. insert the results and delete every registrant of the window.
    ///
    /// Either all of steps 3-4 become visible or none of them do, and two
    /// concurrent calls for the same window never both insert results.
    async fn execute_draw(
        &self,
        window: DrawWindow,
        drawn_at: DateTime<Utc>,
        selector: DrawSelector,
    ) -> RepositoryResult<DrawOutcome>;
}

/// Rows to insert for a draw, split by category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlannedResults {
    pub winners: Vec<NewDrawResult>,
    pub reserves: Vec<NewDrawResult>,
}

impl PlannedResults {
    pub fn all(&self) -> impl Iterator<Item = &NewDrawResult> {
        self.winners.iter().chain(self.reserves.iter())
    }

    pub fn len(&self) -> usize {
        self.winners.len() + self.reserves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.winners.is_empty() && self.reserves.is_empty()
    }
}

/// Turn a selection over `pool` into result rows.
///
/// Rejects positions that fall outside the pool or are picked twice, so a
/// faulty selector cannot duplicate or invent entries.
pub fn plan_results(
    pool: &[Registrant],
    selection: &DrawSelection,
    window: DrawWindow,
) -> RepositoryResult<PlannedResults> {
    let mut seen = HashSet::with_capacity(selection.winners.len() + selection.reserves.len());
    let mut rows = |indices: &[usize], category: DrawCategory| {
        indices
            .iter()
            .map(|&idx| -> RepositoryResult<NewDrawResult> {
                let registrant = pool.get(idx).filter(|_| seen.insert(idx)).ok_or_else(|| {
                    RepositoryError::internal_with_context(
                        format!("Draw selection position {} is invalid", idx),
                        ErrorContext::new("plan_results")
                            .with_entity("draw_window")
                            .with_entity_id(window.epoch_seconds())
                            .with_details(format!("pool_size={}", pool.len())),
                    )
                })?;
                Ok(NewDrawResult {
                    student_id: registrant.student_id.clone(),
                    first_name: registrant.first_name.clone(),
                    last_name: registrant.last_name.clone(),
                    draw_window: window,
                    category,
                })
            })
            .collect::<RepositoryResult<Vec<_>>>()
    };

    let winners = rows(&selection.winners, DrawCategory::Winner)?;
    let reserves = rows(&selection.reserves, DrawCategory::Reserve)?;
    Ok(PlannedResults { winners, reserves })
}
