use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::window::DrawWindow;

/// A student's entry into the lottery for one draw window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registrant {
    /// Surrogate row id. The draw tells entries apart by pool position, never by field equality.
    pub id: i64,
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub registered_at: DateTime<Utc>,
    pub draw_window: DrawWindow,
}

/// Validated registration waiting to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRegistrant {
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub registered_at: DateTime<Utc>,
    pub draw_window: DrawWindow,
}

/// Raw registration input as submitted by a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationForm {
    #[serde(default)]
    pub student_id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
}

impl RegistrationForm {
    pub fn new(
        student_id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            student_id: student_id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            phone: phone.into(),
        }
    }
}
