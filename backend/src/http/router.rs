//! Router configuration for the HTTP API.

use axum::{
    routing::{delete, get},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let admin = Router::new()
        .route(
            "/registrations",
            get(handlers::admin_search_registrations).delete(handlers::admin_remove_registrations),
        )
        .route(
            "/windows/{draw_time}/registrations",
            delete(handlers::admin_clear_window),
        )
        .route("/results", get(handlers::admin_search_results))
        .route("/results/{id}", delete(handlers::admin_remove_result));

    let api_v1 = Router::new()
        .route("/overview", get(handlers::get_overview))
        .route(
            "/registrations",
            get(handlers::list_registrations).post(handlers::create_registration),
        )
        .nest("/admin", admin);

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::LocalRepository;
    use crate::db::repository::FullRepository;
    use std::sync::Arc;

    #[test]
    fn test_router_creation() {
        let repo = Arc::new(LocalRepository::new()) as Arc<dyn FullRepository>;
        let _router = create_router(AppState::new(repo));
    }
}
