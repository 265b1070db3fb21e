//! HTTP handlers for the REST API.
//!
//! Every handler reads the clock once. Handlers that show or change the weekly
//! lists run the draw trigger first with that same instant.

use axum::{
    extract::{FromRequestParts, Path, Query, State},
    http::{request::Parts, StatusCode},
    Json,
};
use chrono::{DateTime, Utc};
use tracing::debug;

use super::dto::{
    HealthResponse, OverviewResponse, RegistrationCreatedResponse, RegistrationForm,
    RegistrationListResponse, RegistrationSearchResponse, RemoveRegistrationsRequest,
    RemovedResponse, ResultSearchResponse, ResultsQuery, SearchQuery,
};
use super::error::AppError;
use super::state::AppState;
use crate::models::{DrawOutcome, DrawWindow};
use crate::services;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Header carrying the admin key.
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

/// Proof that the request carried the configured admin key.
#[derive(Debug, Clone, Copy)]
pub struct AdminAccess;

impl FromRequestParts<AppState> for AdminAccess {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let expected = state.admin_key.as_deref().ok_or(AppError::Forbidden)?;
        let provided = parts
            .headers
            .get(ADMIN_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim);

        match provided {
            Some(key) if key == expected => Ok(AdminAccess),
            _ => {
                debug!(path = %parts.uri.path(), "admin request rejected");
                Err(AppError::Forbidden)
            }
        }
    }
}

async fn trigger_draw(state: &AppState, now: DateTime<Utc>) -> Result<DrawOutcome, AppError> {
    Ok(services::perform_weekly_draw(state.repository.as_ref(), &state.schedule, now).await?)
}

fn window_param(draw_time: i64) -> Result<DrawWindow, AppError> {
    DrawWindow::from_epoch_seconds(draw_time)
        .ok_or_else(|| AppError::bad_request(format!("draw_time {} is out of range", draw_time)))
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match state.repository.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Public views
// =============================================================================

/// GET /v1/overview
///
/// This week's winners and reserves, the next window and its countdown.
pub async fn get_overview(State(state): State<AppState>) -> HandlerResult<OverviewResponse> {
    let now = state.now();
    let draw = trigger_draw(&state, now).await?;
    let overview =
        services::weekly_overview(state.repository.as_ref(), &state.schedule, now).await?;

    Ok(Json(OverviewResponse { overview, draw }))
}

/// POST /v1/registrations
pub async fn create_registration(
    State(state): State<AppState>,
    Json(form): Json<RegistrationForm>,
) -> Result<(StatusCode, Json<RegistrationCreatedResponse>), AppError> {
    let now = state.now();
    trigger_draw(&state, now).await?;
    let registration =
        services::register(state.repository.as_ref(), &state.schedule, &form, now).await?;

    let message = format!(
        "Registered for the draw at {}",
        registration.draw_window.in_zone(&state.schedule.zone).to_rfc3339()
    );
    Ok((
        StatusCode::CREATED,
        Json(RegistrationCreatedResponse {
            registration,
            message,
        }),
    ))
}

/// GET /v1/registrations
///
/// Registrations entered for the next window, newest first.
pub async fn list_registrations(
    State(state): State<AppState>,
) -> HandlerResult<RegistrationListResponse> {
    let now = state.now();
    trigger_draw(&state, now).await?;
    let window = state.schedule.registration_window(now);
    let registrations = state
        .repository
        .fetch_registrations_for_window(window)
        .await?;

    Ok(Json(RegistrationListResponse {
        window,
        total: registrations.len(),
        registrations,
    }))
}

// =============================================================================
// Admin
// =============================================================================

/// GET /v1/admin/registrations?search=
pub async fn admin_search_registrations(
    _admin: AdminAccess,
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> HandlerResult<RegistrationSearchResponse> {
    let registrations =
        services::search_registrations(state.repository.as_ref(), query.search.as_deref()).await?;

    Ok(Json(RegistrationSearchResponse {
        total: registrations.len(),
        registrations,
    }))
}

/// DELETE /v1/admin/registrations
pub async fn admin_remove_registrations(
    _admin: AdminAccess,
    State(state): State<AppState>,
    Json(request): Json<RemoveRegistrationsRequest>,
) -> HandlerResult<RemovedResponse> {
    let removed = services::remove_registrations(state.repository.as_ref(), &request.ids).await?;
    Ok(Json(RemovedResponse { removed }))
}

/// DELETE /v1/admin/windows/{draw_time}/registrations
pub async fn admin_clear_window(
    _admin: AdminAccess,
    State(state): State<AppState>,
    Path(draw_time): Path<i64>,
) -> HandlerResult<RemovedResponse> {
    let window = window_param(draw_time)?;
    let removed = services::clear_window(state.repository.as_ref(), window).await?;
    Ok(Json(RemovedResponse { removed }))
}

/// GET /v1/admin/results?search=&draw_time=
pub async fn admin_search_results(
    _admin: AdminAccess,
    State(state): State<AppState>,
    Query(query): Query<ResultsQuery>,
) -> HandlerResult<ResultSearchResponse> {
    let window = query.draw_time.map(window_param).transpose()?;
    let results =
        services::search_results(state.repository.as_ref(), window, query.search.as_deref())
            .await?;

    Ok(Json(ResultSearchResponse {
        total: results.len(),
        results,
    }))
}

/// DELETE /v1/admin/results/{id}
pub async fn admin_remove_result(
    _admin: AdminAccess,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> HandlerResult<RemovedResponse> {
    let removed = services::remove_result(state.repository.as_ref(), id).await?;
    if removed == 0 {
        return Err(AppError::NotFound(format!("Result {} not found", id)));
    }
    Ok(Json(RemovedResponse { removed }))
}
