//! Registration intake: validation and insertion into the next window's pool.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::db::repository::{FullRepository, RepositoryError};
use crate::models::{DrawSchedule, DrawWindow, NewRegistrant, Registrant, RegistrationForm};

/// Why a registration was rejected.
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    /// A required field is empty or whitespace only.
    #[error("{field} is required")]
    Validation { field: &'static str },

    /// The student already has an entry for the target window.
    #[error("student {student_id} is already registered for the draw at {window}")]
    Duplicate {
        student_id: String,
        window: DrawWindow,
    },

    /// The store could not complete the insert.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Trimmed copy of a form whose fields are all present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedForm {
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

pub fn validate_form(form: &RegistrationForm) -> Result<ValidatedForm, RegistrationError> {
    fn required(value: &str, field: &'static str) -> Result<String, RegistrationError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(RegistrationError::Validation { field });
        }
        Ok(trimmed.to_string())
    }

    Ok(ValidatedForm {
        student_id: required(&form.student_id, "student_id")?,
        first_name: required(&form.first_name, "first_name")?,
        last_name: required(&form.last_name, "last_name")?,
        phone: required(&form.phone, "phone")?,
    })
}

/// Register a student for the window opening at the next cutoff after `now`.
///
/// Uniqueness is left to the store's constraint so that two concurrent
/// submissions for the same student cannot both succeed.
pub async fn register<R: FullRepository + ?Sized>(
    repo: &R,
    schedule: &DrawSchedule,
    form: &RegistrationForm,
    now: DateTime<Utc>,
) -> Result<Registrant, RegistrationError> {
    let form = validate_form(form).inspect_err(|e| warn!(error = %e, "registration rejected"))?;
    let window = schedule.registration_window(now);

    let registrant = NewRegistrant {
        student_id: form.student_id,
        first_name: form.first_name,
        last_name: form.last_name,
        phone: form.phone,
        registered_at: now,
        draw_window: window,
    };

    match repo.insert_registration(&registrant).await {
        Ok(stored) => {
            info!(student_id = %stored.student_id, %window, id = stored.id, "registration accepted");
            Ok(stored)
        }
        Err(e) if e.is_conflict() => {
            warn!(student_id = %registrant.student_id, %window, "duplicate registration");
            Err(RegistrationError::Duplicate {
                student_id: registrant.student_id,
                window,
            })
        }
        Err(e) => Err(e.with_operation("register").into()),
    }
}
