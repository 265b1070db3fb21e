//! Admin operations on registrations and results.
//!
//! Callers are expected to have checked admin capability before calling in.

use tracing::info;

use crate::db::repository::{FullRepository, RepositoryResult};
use crate::models::{DrawResult, DrawWindow, Registrant};

/// Case-insensitive substring match over every column of a row.
fn matches_term(columns: &[String], term: &str) -> bool {
    let term = term.to_lowercase();
    columns.iter().any(|c| c.to_lowercase().contains(&term))
}

fn registrant_columns(r: &Registrant) -> Vec<String> {
    vec![
        r.id.to_string(),
        r.student_id.clone(),
        r.first_name.clone(),
        r.last_name.clone(),
        r.phone.clone(),
        r.registered_at.timestamp().to_string(),
        r.draw_window.epoch_seconds().to_string(),
    ]
}

fn result_columns(r: &DrawResult) -> Vec<String> {
    vec![
        r.id.to_string(),
        r.student_id.clone(),
        r.first_name.clone(),
        r.last_name.clone(),
        r.draw_window.epoch_seconds().to_string(),
        r.category.to_string(),
    ]
}

/// All registrations, optionally narrowed by a search term.
///
/// A blank term returns everything.
pub async fn search_registrations<R: FullRepository + ?Sized>(
    repo: &R,
    term: Option<&str>,
) -> RepositoryResult<Vec<Registrant>> {
    let rows = repo.fetch_all_registrations().await?;
    Ok(match term.map(str::trim).filter(|t| !t.is_empty()) {
        Some(term) => rows
            .into_iter()
            .filter(|r| matches_term(&registrant_columns(r), term))
            .collect(),
        None => rows,
    })
}

/// All results, optionally restricted to one window and narrowed by a search term.
pub async fn search_results<R: FullRepository + ?Sized>(
    repo: &R,
    window: Option<DrawWindow>,
    term: Option<&str>,
) -> RepositoryResult<Vec<DrawResult>> {
    let term = term.map(str::trim).filter(|t| !t.is_empty());
    Ok(repo
        .fetch_all_results()
        .await?
        .into_iter()
        .filter(|r| window.map_or(true, |w| r.draw_window == w))
        .filter(|r| term.map_or(true, |t| matches_term(&result_columns(r), t)))
        .collect())
}

/// Remove the selected registrations in one step. Unknown ids are skipped.
pub async fn remove_registrations<R: FullRepository + ?Sized>(
    repo: &R,
    ids: &[i64],
) -> RepositoryResult<u64> {
    if ids.is_empty() {
        return Ok(0);
    }
    let removed = repo
        .delete_registrations(ids)
        .await
        .map_err(|e| e.with_operation("remove_registrations"))?;
    info!(requested = ids.len(), removed, "admin removed registrations");
    Ok(removed)
}

/// Bulk-clear a window's pool. There is no undo.
pub async fn clear_window<R: FullRepository + ?Sized>(
    repo: &R,
    window: DrawWindow,
) -> RepositoryResult<u64> {
    let removed = repo.delete_registrations_for_window(window).await?;
    info!(%window, removed, "admin cleared registrations for window");
    Ok(removed)
}

pub async fn remove_result<R: FullRepository + ?Sized>(repo: &R, id: i64) -> RepositoryResult<u64> {
    let removed = repo.delete_result(id).await?;
    info!(id, removed, "admin removed draw result");
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_term_is_case_insensitive() {
        let columns = vec!["S100".to_string(), "Ioana".to_string()];
        assert!(matches_term(&columns, "ioa"));
        assert!(matches_term(&columns, "s10"));
        assert!(!matches_term(&columns, "pop"));
    }
}
