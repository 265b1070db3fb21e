use diesel::prelude::*;

use super::schema::{draws, registrations, winners};
use crate::db::repository::{ErrorContext, RepositoryError, RepositoryResult};
use crate::models::{DrawResult, DrawWindow, NewDrawResult, NewRegistrant, Registrant};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = registrations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RegistrationRow {
    pub id: i64,
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub registered_at: i64,
    pub draw_time: i64,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = registrations)]
pub struct NewRegistrationRow {
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub registered_at: i64,
    pub draw_time: i64,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = winners)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct WinnerRow {
    pub id: i64,
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub draw_time: i64,
    pub category: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = winners)]
pub struct NewWinnerRow {
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub draw_time: i64,
    pub category: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = draws)]
pub struct NewDrawRow {
    pub draw_time: i64,
    pub drawn_at: i64,
}

fn window_from_column(seconds: i64, table: &str, id: i64) -> RepositoryResult<DrawWindow> {
    DrawWindow::from_epoch_seconds(seconds).ok_or_else(|| {
        RepositoryError::internal_with_context(
            format!("draw_time {} is out of range", seconds),
            ErrorContext::new("decode_row")
                .with_entity(table)
                .with_entity_id(id),
        )
    })
}

impl From<&NewRegistrant> for NewRegistrationRow {
    fn from(r: &NewRegistrant) -> Self {
        Self {
            student_id: r.student_id.clone(),
            first_name: r.first_name.clone(),
            last_name: r.last_name.clone(),
            phone: r.phone.clone(),
            registered_at: r.registered_at.timestamp(),
            draw_time: r.draw_window.epoch_seconds(),
        }
    }
}

impl TryFrom<RegistrationRow> for Registrant {
    type Error = RepositoryError;

    fn try_from(row: RegistrationRow) -> RepositoryResult<Self> {
        let registered_at = chrono::DateTime::from_timestamp(row.registered_at, 0).ok_or_else(|| {
            RepositoryError::internal_with_context(
                format!("timestamp {} is out of range", row.registered_at),
                ErrorContext::new("decode_row")
                    .with_entity("registrations")
                    .with_entity_id(row.id),
            )
        })?;
        Ok(Registrant {
            id: row.id,
            draw_window: window_from_column(row.draw_time, "registrations", row.id)?,
            student_id: row.student_id,
            first_name: row.first_name,
            last_name: row.last_name,
            phone: row.phone,
            registered_at,
        })
    }
}

impl From<&NewDrawResult> for NewWinnerRow {
    fn from(r: &NewDrawResult) -> Self {
        Self {
            student_id: r.student_id.clone(),
            first_name: r.first_name.clone(),
            last_name: r.last_name.clone(),
            draw_time: r.draw_window.epoch_seconds(),
            category: r.category.as_str().to_string(),
        }
    }
}

impl TryFrom<WinnerRow> for DrawResult {
    type Error = RepositoryError;

    fn try_from(row: WinnerRow) -> RepositoryResult<Self> {
        let category = row.category.parse().map_err(|e: String| {
            RepositoryError::internal_with_context(
                e,
                ErrorContext::new("decode_row")
                    .with_entity("winners")
                    .with_entity_id(row.id),
            )
        })?;
        Ok(DrawResult {
            id: row.id,
            draw_window: window_from_column(row.draw_time, "winners", row.id)?,
            student_id: row.student_id,
            first_name: row.first_name,
            last_name: row.last_name,
            category,
        })
    }
}

pub fn registrants_from_rows(rows: Vec<RegistrationRow>) -> RepositoryResult<Vec<Registrant>> {
    rows.into_iter().map(Registrant::try_from).collect()
}

pub fn results_from_rows(rows: Vec<WinnerRow>) -> RepositoryResult<Vec<DrawResult>> {
    rows.into_iter().map(DrawResult::try_from).collect()
}
