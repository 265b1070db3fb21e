//! The landing view: this week's lists and the state of the next registration window.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::repository::{FullRepository, RepositoryResult};
use crate::models::{DrawCategory, DrawResult, DrawSchedule, Timeline};

#[derive(Debug, Clone, Serialize)]
pub struct WeeklyOverview {
    pub timeline: Timeline,
    pub winners: Vec<DrawResult>,
    pub reserves: Vec<DrawResult>,
    pub winner_cap: usize,
    pub reserve_cap: usize,
    /// Registrations already entered for the next window.
    pub registered: u64,
}

/// Assemble the overview as of `now`.
///
/// Does not trigger the draw; callers run it first with the same `now`.
pub async fn weekly_overview<R: FullRepository + ?Sized>(
    repo: &R,
    schedule: &DrawSchedule,
    now: DateTime<Utc>,
) -> RepositoryResult<WeeklyOverview> {
    let timeline = schedule.timeline(now);
    let winners = repo
        .fetch_results_for_window(timeline.current_window, DrawCategory::Winner)
        .await?;
    let reserves = repo
        .fetch_results_for_window(timeline.current_window, DrawCategory::Reserve)
        .await?;
    let registered = repo
        .count_registrations_for_window(timeline.next_window)
        .await?;

    Ok(WeeklyOverview {
        timeline,
        winners,
        reserves,
        winner_cap: schedule.caps.winners,
        reserve_cap: schedule.caps.reserves,
        registered,
    })
}
