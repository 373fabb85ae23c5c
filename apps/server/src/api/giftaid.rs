use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{error::ApiResult, main_lib::AppState};
use donatio_core::giftaid::{GiftAidBucketKind, GiftAidSchedule};
use donatio_core::utils::DateRange;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExportQuery {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    #[serde(default)]
    bucket: GiftAidBucketKind,
    #[serde(default)]
    include_claimed: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarkEligibleBody {
    donor_id: String,
    #[serde(default)]
    start: Option<NaiveDate>,
    #[serde(default)]
    end: Option<NaiveDate>,
}

#[derive(Serialize)]
struct UpdatedCount {
    updated: usize,
}

async fn get_schedule(
    State(state): State<Arc<AppState>>,
    Query(range): Query<DateRange>,
) -> ApiResult<Json<GiftAidSchedule>> {
    Ok(Json(state.giftaid_service.get_schedule(range)?))
}

async fn export_schedule(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ExportQuery>,
) -> ApiResult<Response> {
    let range = DateRange::new(query.start, query.end)?;
    let export = state
        .giftaid_service
        .export_csv(range, query.bucket, query.include_claimed)?;
    tracing::info!("Exported {} Gift Aid row(s) to {}", export.row_count, export.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export.file_name),
            ),
        ],
        export.content,
    )
        .into_response())
}

async fn mark_claimed(
    State(state): State<Arc<AppState>>,
    Json(range): Json<DateRange>,
) -> ApiResult<Json<UpdatedCount>> {
    let updated = state.giftaid_service.mark_claimed(range).await?;
    Ok(Json(UpdatedCount { updated }))
}

async fn mark_eligible(
    State(state): State<Arc<AppState>>,
    Json(body): Json<MarkEligibleBody>,
) -> ApiResult<Json<UpdatedCount>> {
    let range = DateRange::new(body.start, body.end)?;
    let updated = state
        .giftaid_service
        .mark_eligible(&body.donor_id, range)
        .await?;
    Ok(Json(UpdatedCount { updated }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/giftaid",
            get(get_schedule).post(mark_claimed).patch(mark_eligible),
        )
        .route("/giftaid/export", get(export_schedule))
}
