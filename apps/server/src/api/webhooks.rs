use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::post,
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};
use donatio_core::donations::RecurringChargeOutcome;
use donatio_gateway::{parse_event, verify_signature, GatewayEvent, WebhookError};

const SIGNATURE_HEADER: &str = "stripe-signature";

async fn receive_gateway_event(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let secret = state
        .webhook_secret
        .as_deref()
        .ok_or_else(|| ApiError::Unauthorized("Webhook signing secret is not configured".into()))?;
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing signature header".into()))?;

    verify_signature(&body, signature, secret, Utc::now().timestamp()).map_err(|e| {
        tracing::warn!("Rejected gateway webhook: {}", e);
        ApiError::Unauthorized(e.to_string())
    })?;

    let event = parse_event(&body).map_err(|e| match e {
        WebhookError::InvalidPayload(_) => ApiError::BadRequest(e.to_string()),
        other => ApiError::Unauthorized(other.to_string()),
    })?;

    let result = match event {
        GatewayEvent::InvoicePaid(charge) => {
            match state.donation_service.record_recurring_charge(charge).await? {
                RecurringChargeOutcome::Recorded(donation) => json!({
                    "received": true,
                    "donationNumber": donation.donation_number,
                }),
                RecurringChargeOutcome::Duplicate => json!({ "received": true, "duplicate": true }),
                RecurringChargeOutcome::ZeroAmount | RecurringChargeOutcome::UnknownSubscription => {
                    json!({ "received": true })
                }
            }
        }
        GatewayEvent::Ignored(_) => json!({ "received": true }),
    };
    Ok(Json(result))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/webhooks/gateway", post(receive_gateway_event))
}
