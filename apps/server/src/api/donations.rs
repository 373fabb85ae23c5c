use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::{error::ApiResult, main_lib::AppState};
use donatio_core::donations::{Donation, ManualDonationRequest};

async fn record_manual_donation(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ManualDonationRequest>,
) -> ApiResult<(StatusCode, Json<Donation>)> {
    let donation = state.donation_service.record_manual_donation(request).await?;
    Ok((StatusCode::CREATED, Json(donation)))
}

async fn get_donation(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Donation>> {
    Ok(Json(state.donation_service.get_donation(&id)?))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/donations", post(record_manual_donation))
        .route("/donations/{id}", get(get_donation))
}
