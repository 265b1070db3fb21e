//! Weekly draw engine.
//!
//! The draw is triggered opportunistically (once per request) rather than by a
//! timer, so [`perform_weekly_draw`] must be safe to call any number of times
//! for the same window. Cheap precondition checks run first; the repository
//! then re-checks and performs the draw atomically in
//! [`DrawRepository::execute_draw`](crate::db::repository::DrawRepository::execute_draw).

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::db::repository::{FullRepository, RepositoryResult};
use crate::models::{DrawOutcome, DrawSchedule, DrawSelector};

/// Draw the window that closed most recently before `now`, at most once.
///
/// Uses the OS-seeded generator; see [`perform_weekly_draw_with`] to supply
/// a selector.
pub async fn perform_weekly_draw<R: FullRepository + ?Sized>(
    repo: &R,
    schedule: &DrawSchedule,
    now: DateTime<Utc>,
) -> RepositoryResult<DrawOutcome> {
    perform_weekly_draw_with(repo, schedule, now, DrawSelector::random(schedule.caps)).await
}

/// Draw the most recently closed window using `selector`.
///
/// Preconditions are checked in order: the window has registrations, its
/// cutoff has passed, and no results exist for it yet. Each failed check is a
/// no-op outcome, not an error.
pub async fn perform_weekly_draw_with<R: FullRepository + ?Sized>(
    repo: &R,
    schedule: &DrawSchedule,
    now: DateTime<Utc>,
    selector: DrawSelector,
) -> RepositoryResult<DrawOutcome> {
    let window = schedule.draw_times(now).current;

    if repo.count_registrations_for_window(window).await? == 0 {
        debug!(%window, "no registrations to draw");
        return Ok(DrawOutcome::NoRegistrations { window });
    }

    if !window.has_started(now) {
        debug!(%window, %now, "draw window still open");
        return Ok(DrawOutcome::WindowOpen { window });
    }

    if repo.count_results_for_window(window).await? > 0 {
        debug!(%window, "window already drawn");
        return Ok(DrawOutcome::AlreadyDrawn { window });
    }

    let outcome = repo
        .execute_draw(window, now, selector)
        .await
        .map_err(|e| e.with_operation("perform_weekly_draw"))?;

    match &outcome {
        DrawOutcome::Drawn(summary) => info!(
            %window,
            winners = summary.winners.len(),
            reserves = summary.reserves.len(),
            discarded = summary.discarded,
            "weekly draw completed"
        ),
        other => debug!(%window, ?other, "draw skipped after re-check"),
    }

    Ok(outcome)
}
