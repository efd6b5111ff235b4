//! Manual (and scheduler-driven) execution trigger.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use watchtower_runner::ExecuteError;

use crate::state::AppState;

/// POST /execute/{module_id}
///
/// Body: `{"siteId": "...", ...customInputs}` — everything except `siteId`
/// is passed through to the module's input document. The body is optional.
pub async fn execute_module(
    State(state): State<Arc<AppState>>,
    Path(module_id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut fields = parse_body(&body)?;

    let site_id = match fields.remove("siteId") {
        None | Some(Value::Null) => None,
        Some(value) => Some(
            serde_json::from_value::<Uuid>(value).map_err(|e| {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": format!("invalid siteId: {e}") })),
                )
            })?,
        ),
    };

    let record = state
        .runner
        .execute(module_id, site_id, fields)
        .await
        .map_err(execute_err)?;

    Ok(Json(serde_json::to_value(record).unwrap_or_default()))
}

/// An empty body is a bare trigger; otherwise the body must be a JSON object.
fn parse_body(body: &Bytes) -> Result<Map<String, Value>, (StatusCode, Json<Value>)> {
    if body.is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(Value::Null) => Ok(Map::new()),
        Ok(other) => Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": format!("request body must be a JSON object, got {other}") })),
        )),
        Err(e) => Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": format!("invalid JSON body: {e}") })),
        )),
    }
}

/// Map an execution error to an HTTP response. A repository with no
/// locatable entrypoint is the caller's 404; everything else is a 500 with
/// the error chain as diagnostic detail.
fn execute_err(e: ExecuteError) -> (StatusCode, Json<Value>) {
    let status = match e {
        ExecuteError::EntrypointMissing(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": e.to_string() })))
}

// ── Tests ────────────────────────────────────────────────────────────
