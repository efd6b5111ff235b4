//! HTTP router construction.

use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api;
use crate::state::AppState;

/// Build the application router with all routes and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/execute/{module_id}", post(api::execute_module))
        .route("/schedule", post(api::schedule_module))
        .route(
            "/unschedule/{site_id}/{module_id}",
            delete(api::unschedule_module),
        )
        .route("/schedules", get(api::schedules_list))
        .route("/results/{module_id}", get(api::latest_result))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
