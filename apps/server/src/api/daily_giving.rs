use std::sync::Arc;

use axum::{routing::post, Json, Router};

use crate::{error::ApiResult, main_lib::AppState};
use donatio_core::daily_giving::{build_plan, DailyGivingPlan, DailyGivingRequest};
use donatio_core::utils::time_utils::today_utc;

async fn preview_schedule(
    Json(request): Json<DailyGivingRequest>,
) -> ApiResult<Json<DailyGivingPlan>> {
    Ok(Json(build_plan(&request, today_utc())?))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/daily-giving/schedule", post(preview_schedule))
}
