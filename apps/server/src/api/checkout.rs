use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::{error::ApiResult, main_lib::AppState};
use donatio_core::checkout::{CheckoutRequest, CheckoutResponse, Order};
use donatio_core::confirmation::{ConfirmOrderRequest, ConfirmationAck};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmResponse {
    #[serde(flatten)]
    ack: ConfirmationAck,
    #[serde(skip_serializing_if = "Option::is_none")]
    receipt_warning: Option<String>,
}

async fn create_checkout(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CheckoutRequest>,
) -> ApiResult<Json<CheckoutResponse>> {
    let response = state.checkout_service.create_checkout(request).await?;
    Ok(Json(response))
}

async fn confirm_checkout(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ConfirmOrderRequest>,
) -> ApiResult<Json<ConfirmResponse>> {
    let outcome = state.confirmation_service.confirm_order(request).await?;
    let receipt_warning = outcome.receipt_warning();
    if let Some(warning) = &receipt_warning {
        tracing::warn!("{}: {}", outcome.ack.order_number, warning);
    }
    Ok(Json(ConfirmResponse {
        ack: outcome.ack,
        receipt_warning,
    }))
}

async fn get_order(
    Path(order_number): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Order>> {
    Ok(Json(state.checkout_service.get_order(&order_number)?))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/checkout", post(create_checkout))
        .route("/checkout/confirm", post(confirm_checkout))
        .route("/checkout/{order_number}", get(get_order))
}
