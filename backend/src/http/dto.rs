//! Data Transfer Objects for the HTTP API.

use serde::{Deserialize, Serialize};

pub use crate::models::{DrawOutcome, DrawResult, DrawWindow, Registrant, RegistrationForm};
pub use crate::services::WeeklyOverview;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
}

/// Landing view plus whatever the draw trigger did on this request.
#[derive(Debug, Clone, Serialize)]
pub struct OverviewResponse {
    #[serde(flatten)]
    pub overview: WeeklyOverview,
    pub draw: DrawOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegistrationCreatedResponse {
    pub registration: Registrant,
    pub message: String,
}

/// Registrations for one window, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationListResponse {
    pub window: DrawWindow,
    pub registrations: Vec<Registrant>,
    pub total: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultsQuery {
    pub search: Option<String>,
    /// Restrict to one window, as epoch seconds.
    pub draw_time: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegistrationSearchResponse {
    pub registrations: Vec<Registrant>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultSearchResponse {
    pub results: Vec<DrawResult>,
    pub total: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoveRegistrationsRequest {
    pub ids: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemovedResponse {
    pub removed: u64,
}
