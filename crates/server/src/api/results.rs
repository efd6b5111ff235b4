//! Stored-result retrieval.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsQuery {
    pub site_id: Option<Uuid>,
}

/// GET /results/{module_id}?siteId=
pub async fn latest_result(
    State(state): State<Arc<AppState>>,
    Path(module_id): Path<Uuid>,
    Query(query): Query<ResultsQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match state.sink.latest(module_id, query.site_id).await {
        Some(record) => Ok(Json(serde_json::to_value(record).unwrap_or_default())),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("no stored result for module {module_id}") })),
        )),
    }
}
