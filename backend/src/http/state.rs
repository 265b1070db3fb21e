//! Application state for the HTTP server.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::db::repository::FullRepository;
use crate::models::{Clock, DrawSchedule, SystemClock};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for database operations
    pub repository: Arc<dyn FullRepository>,
    pub schedule: DrawSchedule,
    pub clock: Arc<dyn Clock>,
    /// Shared secret for admin routes; `None` rejects every admin request.
    pub admin_key: Option<String>,
}

impl AppState {
    /// State with the default schedule, the system clock and admin disabled.
    pub fn new(repository: Arc<dyn FullRepository>) -> Self {
        Self {
            repository,
            schedule: DrawSchedule::default(),
            clock: Arc::new(SystemClock),
            admin_key: None,
        }
    }

    pub fn with_schedule(mut self, schedule: DrawSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_admin_key(mut self, admin_key: Option<String>) -> Self {
        self.admin_key = admin_key;
        self
    }

    /// Read the clock. Handlers call this once and reuse the instant.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}
