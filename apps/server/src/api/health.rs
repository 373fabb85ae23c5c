use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::{error::ApiResult, main_lib::AppState};

async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Ready once the database answers.
async fn readyz(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    donatio_storage_sqlite::ping(&state.pool)?;
    Ok(Json(json!({ "status": "ready" })))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
}
