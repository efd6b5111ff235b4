//! Schedule management endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use watchtower_scheduler::{ScheduleError, ScheduleStatus};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    pub site_id: Uuid,
    pub module_id: Uuid,
    pub cron_expression: String,
}

/// POST /schedule
pub async fn schedule_module(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ScheduleRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let next = state
        .scheduler
        .schedule(req.site_id, req.module_id, &req.cron_expression)
        .map_err(schedule_err)?;

    Ok(Json(json!({
        "message": format!(
            "module {} scheduled for site {}; next execution at {}",
            req.module_id,
            req.site_id,
            next.to_rfc3339()
        )
    })))
}

/// DELETE /unschedule/{site_id}/{module_id}
pub async fn unschedule_module(
    State(state): State<Arc<AppState>>,
    Path((site_id, module_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state
        .scheduler
        .unschedule(site_id, module_id)
        .map_err(schedule_err)?;

    Ok(Json(json!({
        "message": format!("schedule for module {module_id} on site {site_id} removed")
    })))
}

/// GET /schedules
pub async fn schedules_list(State(state): State<Arc<AppState>>) -> Json<Vec<ScheduleStatus>> {
    Json(state.scheduler.entries())
}

/// Scheduler validation failures are client errors, not retried server-side.
fn schedule_err(e: ScheduleError) -> (StatusCode, Json<Value>) {
    let status = match e {
        ScheduleError::InvalidCron { .. } | ScheduleError::AlreadyScheduled { .. } => {
            StatusCode::BAD_REQUEST
        }
        ScheduleError::NotScheduled { .. } => StatusCode::NOT_FOUND,
    };
    (status, Json(json!({ "error": e.to_string() })))
}
